// WebSocket server exposing the scoring service to clients.

use std::sync::Arc;

use futures_util::stream::Stream;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::service::ScoringService;

/// Outgoing frames buffered per connection before the reader backs off.
const REPLY_BUFFER: usize = 64;

/// Bind `127.0.0.1:{port}` and serve until the task is cancelled.
pub async fn run(port: u16, service: Arc<ScoringService>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(format!("127.0.0.1:{port}")).await?;
    serve(listener, service).await
}

/// Accept connections on an already-bound listener. Each client gets its own
/// task; all of them share the same read-only service.
pub async fn serve(listener: TcpListener, service: Arc<ScoringService>) -> anyhow::Result<()> {
    let local_addr = listener.local_addr()?;
    info!("WebSocket server listening on {local_addr}");

    loop {
        let (stream, addr) = listener.accept().await?;
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            handle_connection(stream, addr.to_string(), service).await;
        });
    }
}

async fn handle_connection(stream: TcpStream, addr: String, service: Arc<ScoringService>) {
    info!("Accepted TCP connection from {addr}");

    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake failed for {addr}: {e}");
            return;
        }
    };

    let (mut write, read) = ws_stream.split();
    let (tx, mut rx) = mpsc::channel::<Message>(REPLY_BUFFER);

    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = write.send(msg).await {
                debug!("write failed, dropping connection: {e}");
                break;
            }
        }
        let _ = write.close().await;
    });

    // The reader owns the only sender; dropping it lets the writer drain and exit.
    if process_message_stream(read, &service, &tx, &addr).await.is_err() {
        debug!("writer for {addr} went away before the reader finished");
    }
    drop(tx);
    let _ = writer.await;

    info!("Client {addr} disconnected");
}

/// Answer every text frame from `stream` with one reply frame on `tx`.
///
/// Stops at a Close frame, a transport error, or the end of the stream.
/// Binary, Ping and Pong frames are ignored. Returns `Err(())` if the reply
/// channel is closed.
pub async fn process_message_stream<St>(
    mut stream: St,
    service: &ScoringService,
    tx: &mpsc::Sender<Message>,
    addr: &str,
) -> Result<(), ()>
where
    St: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(msg_result) = stream.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                let reply = service.handle_text(text.as_str());
                if tx.send(Message::Text(reply.into())).await.is_err() {
                    return Err(());
                }
            }
            Ok(Message::Close(_)) => {
                info!("Client {addr} sent close frame");
                break;
            }
            Err(e) => {
                warn!("WebSocket error from {addr}: {e}");
                break;
            }
            _ => {}
        }
    }
    Ok(())
}
