//! # Row Serialization
//!
//! The single value type the engine stores: a fixed-schema row of
//! `(id, username, email)`. Rows serialize to exactly [`ROW_SIZE`] bytes —
//! a little-endian `u32` id followed by two NUL-padded text fields — so a
//! leaf cell is always the same size and cell offsets stay pure arithmetic.
//!
//! Text fields hold UTF-8 and are padded with NUL bytes to their fixed
//! capacity; a maximum-length value still leaves one terminating NUL
//! because the capacity includes it.

use std::fmt;

use eyre::{ensure, eyre, Result};

use crate::config::{
    COLUMN_EMAIL_SIZE, COLUMN_USERNAME_SIZE, EMAIL_CAPACITY, EMAIL_OFFSET, ID_OFFSET, ROW_SIZE,
    USERNAME_CAPACITY, USERNAME_OFFSET,
};

/// One row of the fixed schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: String,
    pub email: String,
}

impl Row {
    pub fn new(id: u32, username: &str, email: &str) -> Result<Self> {
        ensure!(
            username.len() <= COLUMN_USERNAME_SIZE,
            "username exceeds {} bytes",
            COLUMN_USERNAME_SIZE
        );
        ensure!(
            email.len() <= COLUMN_EMAIL_SIZE,
            "email exceeds {} bytes",
            COLUMN_EMAIL_SIZE
        );
        Ok(Self {
            id,
            username: username.to_owned(),
            email: email.to_owned(),
        })
    }

    /// Serializes the row into the first [`ROW_SIZE`] bytes of `buf`.
    pub fn write_to(&self, buf: &mut [u8]) -> Result<()> {
        ensure!(
            buf.len() >= ROW_SIZE,
            "buffer too small for row: {} < {}",
            buf.len(),
            ROW_SIZE
        );
        ensure!(
            self.username.len() <= COLUMN_USERNAME_SIZE,
            "username exceeds {} bytes",
            COLUMN_USERNAME_SIZE
        );
        ensure!(
            self.email.len() <= COLUMN_EMAIL_SIZE,
            "email exceeds {} bytes",
            COLUMN_EMAIL_SIZE
        );

        buf[ID_OFFSET..ID_OFFSET + 4].copy_from_slice(&self.id.to_le_bytes());
        write_padded(
            &mut buf[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_CAPACITY],
            self.username.as_bytes(),
        );
        write_padded(
            &mut buf[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_CAPACITY],
            self.email.as_bytes(),
        );
        Ok(())
    }

    /// Deserializes a row from the first [`ROW_SIZE`] bytes of `buf`.
    pub fn read_from(buf: &[u8]) -> Result<Self> {
        ensure!(
            buf.len() >= ROW_SIZE,
            "buffer too small for row: {} < {}",
            buf.len(),
            ROW_SIZE
        );

        let id = u32::from_le_bytes(buf[ID_OFFSET..ID_OFFSET + 4].try_into()?);
        let username = read_padded(&buf[USERNAME_OFFSET..USERNAME_OFFSET + USERNAME_CAPACITY])?;
        let email = read_padded(&buf[EMAIL_OFFSET..EMAIL_OFFSET + EMAIL_CAPACITY])?;

        Ok(Self {
            id,
            username,
            email,
        })
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}

fn write_padded(dst: &mut [u8], src: &[u8]) {
    dst[..src.len()].copy_from_slice(src);
    dst[src.len()..].fill(0);
}

fn read_padded(field: &[u8]) -> Result<String> {
    let len = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    let text = std::str::from_utf8(&field[..len])
        .map_err(|e| eyre!("stored text is not valid UTF-8: {}", e))?;
    Ok(text.to_owned())
}
