//! Connection task.
//!
//! One driver runs per `connect()`. It owns both halves of the stream,
//! feeds inbound lines to the session one at a time and writes queued
//! outbound lines. Lines queued while an inbound line was being handled are
//! flushed before the next inbound line is read.

use futures_util::{SinkExt, StreamExt};
use tokio::io::WriteHalf;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};

use crate::error::{Error, Result};
use crate::transport::{BoxedStream, LineCodec, ServerTarget};

use super::Session;

type LineSink = FramedWrite<WriteHalf<BoxedStream>, LineCodec>;

pub(super) async fn run(
    session: Session,
    target: ServerTarget,
    epoch: u64,
    cancel: CancellationToken,
    outbound: UnboundedReceiver<String>,
) {
    let span = info_span!("session", host = %target.host, port = target.port, epoch);
    drive(session, target, epoch, cancel, outbound)
        .instrument(span)
        .await;
}

async fn drive(
    session: Session,
    target: ServerTarget,
    epoch: u64,
    cancel: CancellationToken,
    mut outbound: UnboundedReceiver<String>,
) {
    let connecting = session.inner.connector.connect(&target);
    let stream = tokio::select! {
        _ = cancel.cancelled() => {
            debug!("cancelled while connecting");
            return;
        }
        stream = connecting => stream,
    };
    let stream = match stream {
        Ok(stream) => stream,
        Err(err) => {
            session.transport_closed(epoch, Some(err));
            return;
        }
    };

    let (reader, writer) = tokio::io::split(stream);
    let mut lines = FramedRead::new(reader, LineCodec::new());
    let mut sink: LineSink = FramedWrite::new(writer, LineCodec::new());

    if !session.transport_ready(epoch) {
        return;
    }

    loop {
        if let Err(err) = flush_pending(&mut sink, &mut outbound).await {
            session.transport_closed(epoch, Some(err));
            return;
        }

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                // disconnect() already published close; write what was
                // queued before it and hang up.
                if let Err(err) = flush_pending(&mut sink, &mut outbound).await {
                    debug!("flush on disconnect failed: {}", err);
                }
                let _ = sink.close().await;
                return;
            }

            Some(line) = outbound.recv() => {
                if let Err(err) = sink.feed(line).await {
                    session.transport_closed(epoch, Some(err));
                    return;
                }
            }

            inbound = lines.next() => match inbound {
                Some(Ok(line)) => session.ingest(epoch, &line),
                Some(Err(err)) => {
                    session.transport_closed(epoch, Some(err));
                    return;
                }
                None => {
                    session.transport_closed(epoch, None);
                    return;
                }
            },
        }
    }
}

/// Write every line already queued, then flush the sink.
async fn flush_pending(sink: &mut LineSink, outbound: &mut UnboundedReceiver<String>) -> Result<(), Error> {
    while let Ok(line) = outbound.try_recv() {
        sink.feed(line).await?;
    }
    sink.flush().await
}
