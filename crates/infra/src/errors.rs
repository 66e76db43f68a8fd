// Copyright 2025 OpenObserve Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("IoError# {0}")]
    IoError(#[from] std::io::Error),
    #[error("DbError# {0}")]
    DbError(#[from] DbError),
    #[error("SerdeJsonError# {0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("SqlxError# {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("SeaOrmError# {0}")]
    SeaOrmError(#[from] sea_orm::DbErr),
    #[error("Message# {0}")]
    Message(String),
    #[error("Not implemented")]
    NotImplemented,
}

#[derive(ThisError, Debug)]
pub enum DbError {
    #[error("key {0} does not exist")]
    KeyNotExists(String),
    #[error("error {0} performing operation on key {1}")]
    DBOperError(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Message("out of cheese".to_string());
        assert_eq!("Message# out of cheese", &err.to_string());

        let err = Error::from(DbError::KeyNotExists("incident/abc".to_string()));
        assert_eq!("DbError# key incident/abc does not exist", &err.to_string());
    }
}
