//! Store Connector
//!
//! Builds a command per call, exchanges it with the store over a fresh
//! connection, and maps the response onto the caller's return contract.

use std::io::{self, BufReader, BufWriter};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::{Result, ThotError};
use crate::protocol::{
    read_response, write_command, Command, CreatePayload, MatchKind, Response, Value,
    DEFAULT_MAX_KEYS,
};

/// Everything a caller can ask of the store.
///
/// No method fails loudly: transport, protocol and store-reported errors all
/// surface as `false`, `None` or an empty list, with details in the logs.
pub trait StoreConnector {
    /// Create a bucket holding at most `max_keys` keys
    fn create(&self, bucket_name: &str, max_keys: u32, is_volatile: bool) -> bool;

    /// Create a non-volatile bucket with the default capacity
    fn create_default(&self, bucket_name: &str) -> bool {
        self.create(bucket_name, DEFAULT_MAX_KEYS, false)
    }

    /// Create a non-volatile bucket
    fn create_with_max_keys(&self, bucket_name: &str, max_keys: u32) -> bool {
        self.create(bucket_name, max_keys, false)
    }

    /// Write `value` under `key`
    fn write<V: Serialize + ?Sized>(&self, bucket_name: &str, key: &str, value: &V) -> bool;

    /// Write `value` under `key`, creating the bucket as volatile if it does
    /// not exist yet
    fn write_create_volatile<V: Serialize + ?Sized>(
        &self,
        bucket_name: &str,
        key: &str,
        value: &V,
    ) -> bool;

    /// Read the value under `key`.
    ///
    /// A stored value that does not convert to `T` reads as `None`.
    fn read<T: DeserializeOwned>(&self, bucket_name: &str, key: &str) -> Option<T>;

    /// Read every value whose key matches `pattern`.
    ///
    /// Only the first element gates the call: if it does not convert to `T`
    /// the whole read is `None`. An empty match is `Some(vec![])`.
    fn read_pattern<T: DeserializeOwned>(&self, bucket_name: &str, pattern: &str)
        -> Option<Vec<T>>;

    /// List the keys of a bucket
    fn get_keys(&self, bucket_name: &str) -> Vec<String>;

    /// List all buckets
    fn get_buckets(&self) -> Vec<String>;

    /// Delete a single key
    fn delete(&self, bucket_name: &str, key: &str) -> bool;

    /// Delete every key matching `pattern`
    fn delete_pattern(&self, bucket_name: &str, pattern: &str) -> bool;
}

/// TCP client for a thot store
#[derive(Debug, Clone, Default)]
pub struct Connector {
    config: Config,
}

impl Connector {
    /// Create a connector for the given config
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Open a connection to the store, honouring the configured timeouts
    fn connect(&self) -> Result<TcpStream> {
        let host = self.config.store_host();
        let port = self.config.port;

        let stream = match self.config.connect_timeout() {
            None => TcpStream::connect((host, port))?,
            Some(timeout) => {
                let mut last_err = None;
                let mut connected = None;
                for addr in (host, port).to_socket_addrs()? {
                    match TcpStream::connect_timeout(&addr, timeout) {
                        Ok(stream) => {
                            connected = Some(stream);
                            break;
                        }
                        Err(e) => last_err = Some(e),
                    }
                }
                match connected {
                    Some(stream) => stream,
                    None => {
                        return Err(ThotError::Io(last_err.unwrap_or_else(|| {
                            io::Error::new(
                                io::ErrorKind::AddrNotAvailable,
                                format!("{}:{} resolved to no addresses", host, port),
                            )
                        })))
                    }
                }
            }
        };

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        stream.set_read_timeout(self.config.read_timeout())?;
        stream.set_write_timeout(self.config.write_timeout())?;

        Ok(stream)
    }

    /// One full request/response cycle over a fresh connection
    fn send_request(&self, command: &Command) -> Result<Response> {
        let stream = self.connect()?;

        let result = exchange(&stream, command);

        // Both directions go down whether or not the exchange worked
        if let Err(e) = stream.shutdown(Shutdown::Both) {
            if e.kind() != io::ErrorKind::NotConnected {
                tracing::trace!("Shutdown after {:?} failed: {}", command.operation(), e);
            }
        }

        result
    }

    /// Send a command, turning any transport or protocol failure into `None`
    fn execute(&self, command: Command) -> Option<Response> {
        tracing::debug!(
            "Sending {:?} for bucket {:?}",
            command.operation(),
            command.bucket_name()
        );

        match self.send_request(&command) {
            Ok(response) => {
                tracing::debug!(
                    "{:?} answered with {:?}",
                    command.operation(),
                    response.kind()
                );
                Some(response)
            }
            Err(e) => {
                tracing::trace!(
                    "{:?} for bucket {:?} failed: {}",
                    command.operation(),
                    command.bucket_name(),
                    e
                );
                None
            }
        }
    }

    fn succeeded(&self, command: Command) -> bool {
        matches!(self.execute(command), Some(Response::Success { .. }))
    }

    fn put<V: Serialize + ?Sized>(
        &self,
        bucket_name: &str,
        key: &str,
        value: &V,
        create_volatile_if_missing: bool,
    ) -> bool {
        let value = match Value::from_serialize(value) {
            Ok(value) => value,
            Err(e) => {
                tracing::trace!("Value for {}/{} is not serializable: {}", bucket_name, key, e);
                return false;
            }
        };

        self.succeeded(Command::write(
            bucket_name,
            key,
            value,
            create_volatile_if_missing,
        ))
    }

    fn remove(&self, bucket_name: &str, key_or_pattern: &str, match_kind: MatchKind) -> bool {
        self.succeeded(Command::delete(bucket_name, key_or_pattern, match_kind))
    }

    fn list(&self, command: Command) -> Vec<String> {
        match self.execute(command) {
            Some(Response::Success { value }) => {
                value.deserialize_into::<Vec<String>>().unwrap_or_else(|e| {
                    tracing::debug!("Listing returned a {}: {}", value.kind_name(), e);
                    Vec::new()
                })
            }
            Some(Response::Error { message }) => {
                tracing::debug!("Listing failed: {}", message);
                Vec::new()
            }
            None => Vec::new(),
        }
    }
}

/// Write one command and read back one response on an open connection
fn exchange(stream: &TcpStream, command: &Command) -> Result<Response> {
    let mut writer = BufWriter::new(stream);
    write_command(&mut writer, command)?;

    let mut reader = BufReader::new(stream);
    read_response(&mut reader)
}

impl StoreConnector for Connector {
    fn create(&self, bucket_name: &str, max_keys: u32, is_volatile: bool) -> bool {
        if max_keys == 0 {
            tracing::error!("Failed to create bucket {}: max_keys must be positive", bucket_name);
            return false;
        }

        let command = Command::create(CreatePayload {
            bucket_name: bucket_name.to_string(),
            max_keys,
            is_volatile,
        });

        match self.execute(command) {
            Some(Response::Success { .. }) => true,
            Some(Response::Error { message }) => {
                tracing::error!("Failed to create bucket {}: {}", bucket_name, message);
                false
            }
            None => false,
        }
    }

    fn write<V: Serialize + ?Sized>(&self, bucket_name: &str, key: &str, value: &V) -> bool {
        self.put(bucket_name, key, value, false)
    }

    fn write_create_volatile<V: Serialize + ?Sized>(
        &self,
        bucket_name: &str,
        key: &str,
        value: &V,
    ) -> bool {
        self.put(bucket_name, key, value, true)
    }

    fn read<T: DeserializeOwned>(&self, bucket_name: &str, key: &str) -> Option<T> {
        let value = self
            .execute(Command::read(bucket_name, key, MatchKind::Absolute))?
            .into_value()?;

        match value.deserialize_into::<T>() {
            Ok(typed) => Some(typed),
            Err(e) => {
                tracing::debug!("{}/{} holds a {}: {}", bucket_name, key, value.kind_name(), e);
                None
            }
        }
    }

    fn read_pattern<T: DeserializeOwned>(
        &self,
        bucket_name: &str,
        pattern: &str,
    ) -> Option<Vec<T>> {
        let value = self
            .execute(Command::read(bucket_name, pattern, MatchKind::Regex))?
            .into_value()?;

        let Some(items) = value.as_list() else {
            tracing::debug!("Pattern read returned a {}", value.kind_name());
            return None;
        };

        let Some(first) = items.first() else {
            return Some(Vec::new());
        };

        if first.deserialize_into::<T>().is_err() {
            return None;
        }

        let mut typed = Vec::with_capacity(items.len());
        for item in items {
            match item.deserialize_into::<T>() {
                Ok(t) => typed.push(t),
                Err(e) => {
                    // Past the first element there is nothing to cast to
                    tracing::debug!("Pattern read returned a mixed list: {}", e);
                    return None;
                }
            }
        }

        Some(typed)
    }

    fn get_keys(&self, bucket_name: &str) -> Vec<String> {
        self.list(Command::keys(bucket_name))
    }

    fn get_buckets(&self) -> Vec<String> {
        self.list(Command::buckets())
    }

    fn delete(&self, bucket_name: &str, key: &str) -> bool {
        self.remove(bucket_name, key, MatchKind::Absolute)
    }

    fn delete_pattern(&self, bucket_name: &str, pattern: &str) -> bool {
        self.remove(bucket_name, pattern, MatchKind::Regex)
    }
}
