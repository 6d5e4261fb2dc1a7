use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::error::ProbeError;
use super::types::SmtpReply;

const MAX_LINE_LEN: u64 = 4096;

/// Line-oriented SMTP client side of one connection.
pub(crate) struct SmtpStream<S> {
    inner: BufReader<S>,
}

impl<S> SmtpStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: S) -> Self {
        Self {
            inner: BufReader::new(stream),
        }
    }

    pub(crate) async fn send_command(&mut self, command: &str) -> Result<(), ProbeError> {
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        let stream = self.inner.get_mut();
        stream.write_all(&line).await.map_err(ProbeError::io)?;
        stream.flush().await.map_err(ProbeError::io)
    }

    /// Read one complete reply, following `NNN-` continuation lines.
    pub(crate) async fn read_reply(&mut self) -> Result<SmtpReply, ProbeError> {
        let mut first_code = None;
        let mut message_lines = Vec::new();
        let code = loop {
            let raw = self.read_line().await?;
            let code_part = raw
                .get(..3)
                .ok_or_else(|| ProbeError::Protocol(format!("invalid SMTP reply: '{raw}'")))?;
            let code = code_part.parse::<u16>().map_err(|_| {
                ProbeError::Protocol(format!("invalid SMTP status code: '{code_part}'"))
            })?;
            match first_code {
                Some(first) if first != code => {
                    return Err(ProbeError::Protocol(format!(
                        "inconsistent SMTP reply codes: {first} vs {code}"
                    )));
                }
                Some(_) => {}
                None => first_code = Some(code),
            }
            let continuation = raw.as_bytes().get(3).copied() == Some(b'-');
            message_lines.push(raw.get(4..).unwrap_or_default().to_string());
            if !continuation {
                break code;
            }
        };
        Ok(SmtpReply::new(code, message_lines.join("\n")))
    }

    /// Best-effort `QUIT` and shutdown; the reply is not awaited.
    pub(crate) async fn close(mut self) {
        let _ = self.send_command("QUIT").await;
        let _ = self.inner.get_mut().shutdown().await;
    }

    async fn read_line(&mut self) -> Result<String, ProbeError> {
        let mut raw = String::new();
        let read = (&mut self.inner)
            .take(MAX_LINE_LEN)
            .read_line(&mut raw)
            .await
            .map_err(ProbeError::io)?;
        if read == 0 {
            return Err(ProbeError::io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed while reading reply",
            )));
        }
        if !raw.ends_with('\n') {
            if read as u64 >= MAX_LINE_LEN {
                return Err(ProbeError::Protocol(format!(
                    "SMTP reply line exceeds {MAX_LINE_LEN} bytes"
                )));
            }
            return Err(ProbeError::io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed mid-line",
            )));
        }
        raw.pop();
        if raw.ends_with('\r') {
            raw.pop();
        }
        Ok(raw)
    }
}
