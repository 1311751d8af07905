//! WebSocket connection implementation using `tokio-tungstenite`.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::{Connection, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A client-side WebSocket [`Connection`].
///
/// Sink and stream halves are locked separately so an outbound send never
/// waits behind a pending receive.
pub struct WsConnection {
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl WsConnection {
    /// Dials `url` and performs the WebSocket handshake, requiring the
    /// given subprotocol.
    ///
    /// Fails with [`TransportError::SubprotocolRejected`] when the server
    /// does not echo the subprotocol back. There is no retry here: a failed
    /// dial is final, as is any later drop of the established connection.
    pub async fn connect(
        url: &str,
        subprotocol: &str,
    ) -> Result<Self, TransportError> {
        let mut request = url.into_client_request().map_err(|e| {
            TransportError::ConnectFailed(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                e,
            ))
        })?;
        request.headers_mut().insert(
            SEC_WEBSOCKET_PROTOCOL,
            HeaderValue::from_str(subprotocol).map_err(|e| {
                TransportError::ConnectFailed(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    e,
                ))
            })?,
        );

        let (ws, response) =
            connect_async(request).await.map_err(|e| {
                TransportError::ConnectFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;

        let negotiated = response
            .headers()
            .get(SEC_WEBSOCKET_PROTOCOL)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        if negotiated.as_deref() != Some(subprotocol) {
            return Err(TransportError::SubprotocolRejected {
                expected: subprotocol.to_owned(),
                negotiated,
            });
        }

        tracing::info!(subprotocol, "WebSocket session established");

        let (sink, stream) = ws.split();
        Ok(Self {
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        })
    }
}

impl Connection for WsConnection {
    type Error = TransportError;

    async fn send(&self, frame: &str) -> Result<(), Self::Error> {
        self.sink
            .lock()
            .await
            .send(Message::text(frame.to_owned()))
            .await
            .map_err(|e| {
                TransportError::SendFailed(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    e,
                ))
            })
    }

    async fn recv(&self) -> Result<Option<String>, Self::Error> {
        let mut stream = self.stream.lock().await;
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => {
                    return String::from_utf8(data.into())
                        .map(Some)
                        .map_err(|e| {
                            TransportError::ReceiveFailed(
                                std::io::Error::new(
                                    std::io::ErrorKind::InvalidData,
                                    e,
                                ),
                            )
                        });
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("WebSocket session closed by peer");
                    return Ok(None);
                }
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.sink.lock().await.close().await.map_err(|e| {
            TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                e,
            ))
        })
    }
}
