//! # Pager
//!
//! The pager owns the database file and maps page numbers to in-memory
//! 4096-byte buffers. All disk I/O goes through it.
//!
//! ## Caching Model
//!
//! A fixed slot array of [`TABLE_MAX_PAGES`] entries holds lazily loaded
//! pages. A `get_page` miss allocates a zeroed buffer and, when the page
//! exists on disk, fills it from the file. Nothing is evicted: pages stay
//! resident until [`Pager::close`] writes every loaded slot back and
//! releases it.
//!
//! ```text
//! get_page(n)
//!     │
//!     ├─ slot loaded ──────────────> &mut buffer
//!     │
//!     └─ slot empty ─> zeroed 4KB ─┬─ n within file ─> read page n
//!                                  └─ n past the end ─> fresh page,
//!                                                       num_pages = n + 1
//! ```
//!
//! ## Allocation
//!
//! New page numbers are handed out monotonically from the tail of the file
//! ([`Pager::unused_page_num`]). Allocation reserves nothing; the next
//! `get_page` materializes the buffer. There is no free list and freed
//! pages are never reclaimed.
//!
//! ## Durability
//!
//! Writes live in the page cache until close, which flushes every loaded
//! page in file order and syncs the file. A crash before close loses all
//! mutations since open.
//!
//! ## Failure Model
//!
//! Every error from this module is fatal to the engine: an unopenable
//! file, a file whose length is not page-aligned, I/O failures, a page
//! number past [`TABLE_MAX_PAGES`], or flushing a slot that was never
//! loaded. Callers propagate these; there is no retry.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use eyre::{ensure, eyre, Result, WrapErr};

use crate::config::{PAGE_SIZE, TABLE_MAX_PAGES};

/// One fixed-size page buffer.
pub type Page = [u8; PAGE_SIZE];

#[derive(Debug)]
pub struct Pager {
    file: File,
    file_length: u64,
    num_pages: u32,
    pages: Vec<Option<Box<Page>>>,
}

impl Pager {
    /// Opens (or creates) the database file and prepares an empty cache.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)
            .wrap_err_with(|| format!("failed to open database file {:?}", path))?;

        let file_length = file
            .seek(SeekFrom::End(0))
            .wrap_err("failed to determine database file length")?;
        ensure!(
            file_length % PAGE_SIZE as u64 == 0,
            "corrupt database file: length {} is not a whole number of {}-byte pages",
            file_length,
            PAGE_SIZE
        );

        let mut pages = Vec::with_capacity(TABLE_MAX_PAGES);
        pages.resize_with(TABLE_MAX_PAGES, || None);

        Ok(Self {
            file,
            file_length,
            num_pages: (file_length / PAGE_SIZE as u64) as u32,
            pages,
        })
    }

    /// Number of pages the table occupies, counting pages created in
    /// memory but not yet flushed.
    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Next free page number at the tail of the file.
    pub fn unused_page_num(&self) -> u32 {
        self.num_pages
    }

    /// Returns the buffer for `page_num`, loading it from disk on a miss.
    pub fn get_page(&mut self, page_num: u32) -> Result<&mut Page> {
        ensure!(
            (page_num as usize) < TABLE_MAX_PAGES,
            "page number {} out of range: the table is limited to {} pages",
            page_num,
            TABLE_MAX_PAGES
        );

        if self.pages[page_num as usize].is_none() {
            let mut page: Box<Page> = Box::new([0u8; PAGE_SIZE]);

            let pages_on_disk = (self.file_length / PAGE_SIZE as u64) as u32;
            if page_num < pages_on_disk {
                self.file
                    .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))
                    .wrap_err_with(|| format!("failed to seek to page {}", page_num))?;
                // A short read at the tail of the file fills only a prefix
                // and leaves the rest zeroed.
                match self.file.read_exact(&mut page[..]) {
                    Ok(()) => {}
                    Err(e) if e.kind() == ErrorKind::UnexpectedEof => {}
                    Err(e) => {
                        return Err(e).wrap_err_with(|| format!("failed to read page {}", page_num))
                    }
                }
            }

            if page_num >= self.num_pages {
                self.num_pages = page_num + 1;
            }

            self.pages[page_num as usize] = Some(page);
        }

        self.pages[page_num as usize]
            .as_deref_mut()
            .ok_or_else(|| eyre!("page {} missing from cache after load", page_num))
    }

    /// Writes the full page back to the file. The slot must be loaded.
    pub fn flush(&mut self, page_num: u32) -> Result<()> {
        let page = self
            .pages
            .get(page_num as usize)
            .and_then(|slot| slot.as_deref())
            .ok_or_else(|| eyre!("tried to flush page {} that was never loaded", page_num))?;

        self.file
            .seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))
            .wrap_err_with(|| format!("failed to seek to page {}", page_num))?;
        self.file
            .write_all(&page[..])
            .wrap_err_with(|| format!("failed to write page {}", page_num))?;

        self.file_length = self
            .file_length
            .max((page_num as u64 + 1) * PAGE_SIZE as u64);
        Ok(())
    }

    /// Flushes every loaded page, syncs the file, and empties the cache.
    pub fn close(&mut self) -> Result<()> {
        for page_num in 0..self.num_pages {
            if self.pages[page_num as usize].is_some() {
                self.flush(page_num)?;
                self.pages[page_num as usize] = None;
            }
        }
        self.file.sync_all().wrap_err("failed to sync database file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_an_empty_database() {
        let dir = tempdir().unwrap();
        let pager = Pager::open(dir.path().join("test.db")).unwrap();

        assert_eq!(pager.num_pages(), 0);
        assert_eq!(pager.unused_page_num(), 0);
    }

    #[test]
    fn open_rejects_unaligned_file_length() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        std::fs::write(&path, vec![0u8; PAGE_SIZE + 1]).unwrap();

        let result = Pager::open(&path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("corrupt"));
    }

    #[test]
    fn get_page_rejects_out_of_range_page_numbers() {
        let dir = tempdir().unwrap();
        let mut pager = Pager::open(dir.path().join("test.db")).unwrap();

        let result = pager.get_page(TABLE_MAX_PAGES as u32);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("out of range"));
    }

    #[test]
    fn fresh_pages_are_zeroed_and_counted() {
        let dir = tempdir().unwrap();
        let mut pager = Pager::open(dir.path().join("test.db")).unwrap();

        let page = pager.get_page(0).unwrap();
        assert!(page.iter().all(|&b| b == 0));
        assert_eq!(pager.num_pages(), 1);

        pager.get_page(2).unwrap();
        assert_eq!(pager.num_pages(), 3);
    }

    #[test]
    fn flush_requires_a_loaded_slot() {
        let dir = tempdir().unwrap();
        let mut pager = Pager::open(dir.path().join("test.db")).unwrap();

        let result = pager.flush(0);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("never loaded"));
    }

    #[test]
    fn pages_round_trip_through_close_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut pager = Pager::open(&path).unwrap();
            let page = pager.get_page(0).unwrap();
            page[0] = 0xAB;
            page[PAGE_SIZE - 1] = 0xCD;
            let page = pager.get_page(1).unwrap();
            page[7] = 0x77;
            pager.close().unwrap();
        }

        let mut pager = Pager::open(&path).unwrap();
        assert_eq!(pager.num_pages(), 2);
        let page = pager.get_page(0).unwrap();
        assert_eq!(page[0], 0xAB);
        assert_eq!(page[PAGE_SIZE - 1], 0xCD);
        let page = pager.get_page(1).unwrap();
        assert_eq!(page[7], 0x77);
    }

    #[test]
    fn cached_writes_are_invisible_until_close() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let mut pager = Pager::open(&path).unwrap();
        pager.get_page(0).unwrap()[0] = 0xEE;

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
        pager.close().unwrap();
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            PAGE_SIZE as u64
        );
    }
}
