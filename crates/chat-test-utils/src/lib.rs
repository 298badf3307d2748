use chat_protocol::{decode_line, encode, Frame};
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// A raw-socket client that speaks the `COMMAND:JSON\n` wire protocol, for
/// driving a running server the same way a real client would.
pub struct TestClient {
    write: tokio::net::tcp::OwnedWriteHalf,
    read: BufReader<tokio::net::tcp::OwnedReadHalf>,
}

impl TestClient {
    pub async fn connect(addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let stream = TcpStream::connect(addr).await?;
        let (read, write) = stream.into_split();
        Ok(Self {
            write,
            read: BufReader::new(read),
        })
    }

    pub async fn send(&mut self, command: &str, payload: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(payload)?;
        let line = encode(command, &json);
        self.write.write_all(line.as_bytes()).await?;
        Ok(())
    }

    pub async fn send_raw(&mut self, line: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.write.write_all(line.as_bytes()).await?;
        if !line.ends_with('\n') {
            self.write.write_all(b"\n").await?;
        }
        Ok(())
    }

    /// Reads the next non-blank line and decodes it into a `Frame`.
    pub async fn recv_frame(&mut self) -> Result<Frame, Box<dyn std::error::Error>> {
        loop {
            let mut line = String::new();
            let n = self.read.read_line(&mut line).await?;
            if n == 0 {
                return Err("connection closed by server".into());
            }
            match decode_line(&line)? {
                Some(frame) => return Ok(frame),
                None => continue,
            }
        }
    }

    /// Reads the next frame and deserializes its payload, asserting the
    /// command name matches what was expected.
    pub async fn recv<T: DeserializeOwned>(&mut self, expected_command: &str) -> Result<T, Box<dyn std::error::Error>> {
        let frame = self.recv_frame().await?;
        if frame.command != expected_command {
            return Err(format!(
                "expected command {expected_command}, got {} ({})",
                frame.command, frame.payload
            )
            .into());
        }
        Ok(serde_json::from_str(&frame.payload)?)
    }

    pub async fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.write.shutdown().await?;
        Ok(())
    }
}

/// Registers a fresh account and returns the login token from the response.
pub async fn register_and_login(
    client: &mut TestClient,
    account: &str,
    password: &str,
) -> Result<chat_protocol::LoginResponse, Box<dyn std::error::Error>> {
    client
        .send(
            chat_protocol::command::REGISTER,
            &chat_protocol::RegisterRequest {
                account: account.to_owned(),
                password: password.to_owned(),
                confirm_password: password.to_owned(),
            },
        )
        .await?;
    let _reg: chat_protocol::RegisterResponse =
        client.recv(chat_protocol::command::REGISTER_RESP).await?;

    client
        .send(
            chat_protocol::command::LOGIN,
            &chat_protocol::LoginRequest {
                account: account.to_owned(),
                password: password.to_owned(),
            },
        )
        .await?;
    client.recv(chat_protocol::command::LOGIN_RESP).await
}
