//! Store double shared by the integration tests.
//!
//! Listens on an ephemeral localhost port and serves one exchange per
//! connection, either from a script or from a small in-memory store.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::io::{BufReader, BufWriter, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use crossbeam::channel::{unbounded, Receiver, Sender};
use regex::Regex;
use thot::protocol::{read_command, write_response, Command, MatchKind, Payload, Response, Value};
use thot::Config;

/// What the double does with one connection
pub enum Reply {
    /// Answer with a response
    Respond(Response),
    /// Read the command, then close without answering
    Hangup,
    /// Answer with raw bytes
    Garbage(Vec<u8>),
}

pub struct StoreDouble {
    port: u16,
    commands: Receiver<Command>,
}

impl StoreDouble {
    /// Answer connections with `replies`, in order, then stop listening
    pub fn scripted(replies: Vec<Reply>) -> Self {
        let mut replies = replies.into_iter();
        Self::spawn(move |_| replies.next(), true)
    }

    /// Serve a small in-memory store for as long as the test runs
    pub fn in_memory() -> Self {
        let mut store = MemoryStore::default();
        Self::spawn(move |command| Some(Reply::Respond(store.apply(command))), false)
    }

    fn spawn<F>(mut handler: F, stop_when_exhausted: bool) -> Self
    where
        F: FnMut(&Command) -> Option<Reply> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind store double");
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = unbounded();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                if !serve(stream, &mut handler, &tx) && stop_when_exhausted {
                    break;
                }
            }
        });

        Self { port, commands: rx }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Client config pointed at this double
    pub fn config(&self) -> Config {
        Config::builder()
            .port(self.port)
            .connect_timeout_ms(2000)
            .read_timeout_ms(5000)
            .write_timeout_ms(5000)
            .build()
    }

    /// Next command the double received
    pub fn next_command(&self) -> Command {
        self.commands
            .recv_timeout(Duration::from_secs(5))
            .expect("store double received no command")
    }

    /// True if no command arrives within a short grace period
    pub fn received_nothing(&self) -> bool {
        self.commands.recv_timeout(Duration::from_millis(200)).is_err()
    }
}

/// Serve one connection; false once the handler has nothing left to say
fn serve<F>(stream: TcpStream, handler: &mut F, tx: &Sender<Command>) -> bool
where
    F: FnMut(&Command) -> Option<Reply>,
{
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut writer = BufWriter::new(stream);

    let Ok(command) = read_command(&mut reader) else {
        return true;
    };

    let reply = handler(&command);
    let _ = tx.send(command);

    match reply {
        Some(Reply::Respond(response)) => {
            let _ = write_response(&mut writer, &response);
            true
        }
        Some(Reply::Hangup) => true,
        Some(Reply::Garbage(bytes)) => {
            let _ = writer.write_all(&bytes);
            let _ = writer.flush();
            true
        }
        None => false,
    }
}

/// A minimal store: buckets of keyed values, regex matching over keys
#[derive(Default)]
pub struct MemoryStore {
    buckets: HashMap<String, BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn apply(&mut self, command: &Command) -> Response {
        let bucket_name = command.bucket_name().unwrap_or_default().to_string();

        match command.payload() {
            Payload::Create(create) => {
                if self.buckets.contains_key(&create.bucket_name) {
                    return Response::error(format!("bucket {} exists", create.bucket_name));
                }
                self.buckets.insert(create.bucket_name.clone(), BTreeMap::new());
                Response::ok()
            }
            Payload::Write(write) => {
                if !self.buckets.contains_key(&bucket_name) && !write.create_volatile_if_missing {
                    return Response::error(format!("no bucket {}", bucket_name));
                }
                self.buckets
                    .entry(bucket_name)
                    .or_default()
                    .insert(write.key.clone(), write.value.clone());
                Response::ok()
            }
            Payload::Read(read) => {
                let Some(bucket) = self.buckets.get(&bucket_name) else {
                    return Response::error(format!("no bucket {}", bucket_name));
                };
                match read.match_kind {
                    MatchKind::Absolute => match bucket.get(&read.key_or_pattern) {
                        Some(value) => Response::success(value.clone()),
                        None => Response::error(format!("no key {}", read.key_or_pattern)),
                    },
                    MatchKind::Regex => {
                        let Ok(re) = Regex::new(&read.key_or_pattern) else {
                            return Response::error("bad pattern");
                        };
                        let values = bucket
                            .iter()
                            .filter(|(key, _)| re.is_match(key))
                            .map(|(_, value)| value.clone())
                            .collect();
                        Response::success(Value::List(values))
                    }
                }
            }
            Payload::Delete(delete) => {
                let Some(bucket) = self.buckets.get_mut(&bucket_name) else {
                    return Response::error(format!("no bucket {}", bucket_name));
                };
                match delete.match_kind {
                    MatchKind::Absolute => match bucket.remove(&delete.key_or_pattern) {
                        Some(_) => Response::ok(),
                        None => Response::error(format!("no key {}", delete.key_or_pattern)),
                    },
                    MatchKind::Regex => {
                        let Ok(re) = Regex::new(&delete.key_or_pattern) else {
                            return Response::error("bad pattern");
                        };
                        bucket.retain(|key, _| !re.is_match(key));
                        Response::ok()
                    }
                }
            }
            Payload::Keys => match self.buckets.get(&bucket_name) {
                Some(bucket) => Response::success(Value::List(
                    bucket.keys().map(|k| Value::from(k.as_str())).collect(),
                )),
                None => Response::error(format!("no bucket {}", bucket_name)),
            },
            Payload::Buckets => {
                let mut names: Vec<&String> = self.buckets.keys().collect();
                names.sort();
                Response::success(Value::List(
                    names.into_iter().map(|n| Value::from(n.as_str())).collect(),
                ))
            }
        }
    }
}

/// A port nothing is listening on
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
