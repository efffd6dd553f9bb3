//! Database connection parameters
//!
//! Both roles take the same six parameters, one per command-line switch:
//! `-T` server type, `-S` server name, `-U` user, `-P` password,
//! `-B` database and `-R` property string.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Usage line printed when a required parameter is missing
pub const CONNECTION_USAGE: &str = "Usage: -T <server type> -R <propertyString> \
     [-S <serverName>] [-U <userName>] [-P <password>] [-B <databaseName>]";

/// Parameters for opening a database connection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionParams {
    /// Server type (`-T`), required
    pub server_type: String,
    /// Server name (`-S`)
    pub server_name: String,
    /// User name (`-U`)
    pub user: String,
    /// Password (`-P`); never echoed
    pub password: String,
    /// Database name (`-B`)
    pub database: String,
    /// Property string (`-R`), required
    pub properties: String,
}

impl ConnectionParams {
    /// True when the required server type and property string are set
    pub fn is_complete(&self) -> bool {
        !self.server_type.is_empty() && !self.properties.is_empty()
    }

    /// Slot for a switch letter, if it names one
    pub fn slot_mut(&mut self, switch: char) -> Option<&mut String> {
        match switch {
            'T' => Some(&mut self.server_type),
            'S' => Some(&mut self.server_name),
            'U' => Some(&mut self.user),
            'P' => Some(&mut self.password),
            'B' => Some(&mut self.database),
            'R' => Some(&mut self.properties),
            _ => None,
        }
    }

    /// Overlay every non-empty field of `other`
    pub fn merge(&mut self, other: &ConnectionParams) {
        for (dst, src) in [
            (&mut self.server_type, &other.server_type),
            (&mut self.server_name, &other.server_name),
            (&mut self.user, &other.user),
            (&mut self.password, &other.password),
            (&mut self.database, &other.database),
            (&mut self.properties, &other.properties),
        ] {
            if !src.is_empty() {
                dst.clone_from(src);
            }
        }
    }
}

/// Prints the parameter block with the password masked
impl fmt::Display for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = if self.password.is_empty() { "" } else { "********" };
        writeln!(f, "Server Type     : {}", self.server_type)?;
        writeln!(f, "Server Name     : {}", self.server_name)?;
        writeln!(f, "User Name       : {}", self.user)?;
        writeln!(f, "Password        : {}", password)?;
        writeln!(f, "Database Name   : {}", self.database)?;
        write!(f, "Property String : {}", self.properties)
    }
}
