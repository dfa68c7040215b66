// adcs_core/src/io/memcached.rs

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use super::channel::CommandChannel;
use super::codec::RAW_DATA_FLAG;
use crate::errors::ChannelError;

/// Longest key the memcached text protocol accepts.
pub const MAX_KEY_LEN: usize = 250;

/// Largest payload accepted in a `get` reply. Command values are 8 bytes;
/// anything past this cap is a corrupt header, not a value.
pub const MAX_VALUE_LEN: usize = 1024;

/// Default client timeout for connect, read and write.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Memcached text-protocol client over TCP.
///
/// The connection is opened lazily and dropped after any failed exchange, so
/// a timed-out reply can never be mistaken for the answer to the next request.
#[derive(Debug)]
pub struct MemcachedChannel {
    address: SocketAddr,
    timeout: Duration,
    connection: Option<Connection>,
}

#[derive(Debug)]
struct Connection {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Connection {
    fn open(address: SocketAddr, timeout: Duration) -> Result<Self, ChannelError> {
        let stream = TcpStream::connect_timeout(&address, timeout)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;
        debug!(%address, "Connected to memcached");
        Ok(Self {
            writer: stream.try_clone()?,
            reader: BufReader::new(stream),
        })
    }

    fn read_line(&mut self) -> Result<String, ChannelError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(ChannelError::Protocol("connection closed by server".into()));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn get(&mut self, key: &str) -> Result<Option<Vec<u8>>, ChannelError> {
        write!(self.writer, "get {key}\r\n")?;
        self.writer.flush()?;

        let header = self.read_line()?;
        if header == "END" {
            return Ok(None);
        }

        let mut parts = header.split_whitespace();
        let len = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("VALUE"), Some(k), Some(_flags), Some(len)) if k == key => len
                .parse::<usize>()
                .map_err(|_| ChannelError::Protocol(format!("bad length in '{header}'")))?,
            _ => return Err(ChannelError::Protocol(format!("unexpected reply '{header}'"))),
        };

        if len > MAX_VALUE_LEN {
            return Err(ChannelError::Protocol(format!(
                "value length {len} exceeds {MAX_VALUE_LEN} bytes in '{header}'"
            )));
        }

        // Payload plus its trailing CRLF.
        let framed = len
            .checked_add(2)
            .ok_or_else(|| ChannelError::Protocol(format!("bad length in '{header}'")))?;
        let mut data = vec![0u8; framed];
        self.reader.read_exact(&mut data)?;
        if !data.ends_with(b"\r\n") {
            return Err(ChannelError::Protocol("payload not terminated by CRLF".into()));
        }
        data.truncate(len);

        match self.read_line()?.as_str() {
            "END" => Ok(Some(data)),
            other => Err(ChannelError::Protocol(format!("expected END, got '{other}'"))),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), ChannelError> {
        write!(self.writer, "set {key} {RAW_DATA_FLAG} 0 {}\r\n", value.len())?;
        self.writer.write_all(value)?;
        self.writer.write_all(b"\r\n")?;
        self.writer.flush()?;

        match self.read_line()?.as_str() {
            "STORED" => Ok(()),
            other => Err(ChannelError::Protocol(format!("set '{key}' rejected: '{other}'"))),
        }
    }
}

impl MemcachedChannel {
    /// Resolves `address` (e.g. `"127.0.0.1:11211"`). No connection is made
    /// until the first request.
    pub fn new(address: &str, timeout: Duration) -> Result<Self, ChannelError> {
        let resolved = address
            .to_socket_addrs()
            .map_err(|_| ChannelError::Unresolved(address.to_string()))?
            .next()
            .ok_or_else(|| ChannelError::Unresolved(address.to_string()))?;
        info!(address = %resolved, ?timeout, "Using memcached command channel");
        Ok(Self {
            address: resolved,
            timeout,
            connection: None,
        })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    fn exchange<T>(
        &mut self,
        request: impl FnOnce(&mut Connection) -> Result<T, ChannelError>,
    ) -> Result<T, ChannelError> {
        let mut connection = match self.connection.take() {
            Some(connection) => connection,
            None => Connection::open(self.address, self.timeout)?,
        };
        let result = request(&mut connection);
        if result.is_ok() {
            self.connection = Some(connection);
        }
        result
    }
}

fn validate_key(key: &str) -> Result<(), ChannelError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && !key.chars().any(|c| c.is_whitespace() || c.is_control());
    if valid {
        Ok(())
    } else {
        Err(ChannelError::InvalidKey(key.to_string()))
    }
}

impl CommandChannel for MemcachedChannel {
    fn fetch(&mut self, key: &str) -> Result<Option<Vec<u8>>, ChannelError> {
        validate_key(key)?;
        self.exchange(|connection| connection.get(key))
    }

    fn store(&mut self, key: &str, value: &[u8]) -> Result<(), ChannelError> {
        validate_key(key)?;
        self.exchange(|connection| connection.set(key, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::TcpListener;
    use std::thread;

    /// Minimal memcached stand-in: serves get/set from a map, one client at
    /// a time, until the test process exits.
    fn spawn_fake_server() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let mut items: HashMap<String, Vec<u8>> = HashMap::new();
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let mut writer = stream.try_clone().unwrap();
                let mut reader = BufReader::new(stream);
                let mut line = String::new();
                loop {
                    line.clear();
                    if reader.read_line(&mut line).unwrap_or(0) == 0 {
                        break;
                    }
                    let parts: Vec<&str> = line.trim_end().split(' ').collect();
                    match parts.as_slice() {
                        ["get", key] => {
                            if let Some(value) = items.get(*key) {
                                write!(writer, "VALUE {key} 14 {}\r\n", value.len()).unwrap();
                                writer.write_all(value).unwrap();
                                writer.write_all(b"\r\n").unwrap();
                            }
                            writer.write_all(b"END\r\n").unwrap();
                        }
                        ["set", key, _flags, _exptime, len] => {
                            let len: usize = len.parse().unwrap();
                            let mut data = vec![0u8; len + 2];
                            reader.read_exact(&mut data).unwrap();
                            data.truncate(len);
                            items.insert(key.to_string(), data);
                            writer.write_all(b"STORED\r\n").unwrap();
                        }
                        _ => writer.write_all(b"ERROR\r\n").unwrap(),
                    }
                }
            }
        });
        addr
    }

    /// Answers every request with the same raw bytes.
    fn spawn_scripted_server(reply: String) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let mut writer = stream.try_clone().unwrap();
                let mut reader = BufReader::new(stream);
                let mut line = String::new();
                while reader.read_line(&mut line).unwrap_or(0) > 0 {
                    let _ = writer.write_all(reply.as_bytes());
                    line.clear();
                }
            }
        });
        addr
    }

    fn client(addr: SocketAddr) -> MemcachedChannel {
        MemcachedChannel::new(&addr.to_string(), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn stored_bytes_come_back_unchanged() {
        let mut channel = client(spawn_fake_server());
        // Includes CR/LF bytes to exercise length-delimited reads.
        let payload = [0x0d, 0x0a, 0x00, 0xff, 0x3f, 0xf0, 0x0a, 0x0d];

        channel.store("Simulation_Torque_X", &payload).unwrap();

        assert_eq!(channel.fetch("Simulation_Torque_X").unwrap(), Some(payload.to_vec()));
    }

    #[test]
    fn missing_key_is_none() {
        let mut channel = client(spawn_fake_server());
        assert_eq!(channel.fetch("Simulation_Torque_Y").unwrap(), None);
    }

    #[test]
    fn keys_with_spaces_are_rejected_before_sending() {
        let mut channel = client(spawn_fake_server());
        assert!(matches!(
            channel.fetch("bad key"),
            Err(ChannelError::InvalidKey(_))
        ));
        assert!(matches!(
            channel.store(&"k".repeat(MAX_KEY_LEN + 1), &[0]),
            Err(ChannelError::InvalidKey(_))
        ));
    }

    #[test]
    fn oversized_length_header_is_a_protocol_error() {
        for len in [usize::MAX, u32::MAX as usize, MAX_VALUE_LEN + 1] {
            let reply = format!("VALUE Simulation_Torque_X 14 {len}\r\n");
            let mut channel = client(spawn_scripted_server(reply));

            let result = channel.fetch("Simulation_Torque_X");

            assert!(
                matches!(result, Err(ChannelError::Protocol(_))),
                "length {len} gave {result:?}"
            );
        }
    }

    #[test]
    fn refused_connection_is_an_io_error() {
        // Bind then drop to get a port with nothing listening.
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let mut channel = MemcachedChannel::new(&addr.to_string(), Duration::from_millis(200)).unwrap();

        assert!(matches!(channel.fetch("Simulation_Torque_Z"), Err(ChannelError::Io(_))));
    }

    #[test]
    fn unresolvable_address_is_reported() {
        assert!(matches!(
            MemcachedChannel::new("not an address", DEFAULT_TIMEOUT),
            Err(ChannelError::Unresolved(_))
        ));
    }
}
