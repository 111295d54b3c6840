//! Single request/response exchange with the relay over TCP.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde_json::Value;

use crate::errors::ClientError;

pub(crate) fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, ClientError> {
    let endpoint = format!("{host}:{port}");
    let address = resolve(host, port).map_err(|source| ClientError::Resolve {
        endpoint: endpoint.clone(),
        source,
    })?;
    let stream = TcpStream::connect_timeout(&address, timeout).map_err(|source| {
        ClientError::Connect {
            endpoint: endpoint.clone(),
            source,
        }
    })?;
    stream
        .set_read_timeout(Some(timeout))
        .map_err(|source| ClientError::Connect { endpoint, source })?;
    Ok(stream)
}

fn resolve(host: &str, port: u16) -> io::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses"))
}

/// Writes `request` as one line and reads exactly one response line.
pub(crate) fn exchange(stream: TcpStream, request: &Value) -> Result<Value, ClientError> {
    let mut line = serde_json::to_vec(request).map_err(ClientError::SerialiseRequest)?;
    line.push(b'\n');

    let mut writer = &stream;
    writer.write_all(&line).map_err(ClientError::SendRequest)?;
    writer.flush().map_err(ClientError::SendRequest)?;

    let mut reader = BufReader::new(&stream);
    let mut response = String::new();
    let read = reader
        .read_line(&mut response)
        .map_err(ClientError::ReadResponse)?;
    if read == 0 {
        return Err(ClientError::ConnectionClosed);
    }
    serde_json::from_str(response.trim()).map_err(ClientError::ParseResponse)
}
