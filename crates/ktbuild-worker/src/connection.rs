//! Persistent worker protocol loop.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use ktbuild_proto::{read_delimited, write_delimited, WorkRequest, WorkResponse};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::context::WorkerContext;
use crate::error::WorkerError;
use crate::logging::Granularity;
use crate::worker::Work;

/// Capacity of the outbound response queue.
const RESPONSE_QUEUE: usize = 32;

/// Serves length-delimited work requests until the input closes.
///
/// Every request runs on its own blocking thread. Responses are written by a
/// single writer in completion order; each carries its request id.
pub struct PersistentWorker {
    context: WorkerContext,
    work: Arc<dyn Work>,
    working_dir: PathBuf,
}

impl PersistentWorker {
    /// Create a new PersistentWorker.
    pub fn new(context: WorkerContext, work: Arc<dyn Work>, working_dir: PathBuf) -> Self {
        Self {
            context,
            work,
            working_dir,
        }
    }

    /// Run the request loop.
    ///
    /// Returns when `reader` reaches end of input and every dispatched request
    /// has been answered. Reading or writing the protocol stream is the only
    /// failure returned; the first such failure on either side stops the loop
    /// and abandons requests still in flight.
    pub async fn run<R, W>(&self, mut reader: R, writer: W) -> Result<(), WorkerError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (tx, rx) = mpsc::channel::<WorkResponse>(RESPONSE_QUEUE);

        let dispatch = self.dispatch_requests(&mut reader, tx);
        let write = write_responses(writer, rx);
        tokio::pin!(dispatch, write);

        let result = tokio::select! {
            read_result = &mut dispatch => match read_result {
                // The writer drains the queue once every sender is gone.
                Ok(()) => write.await,
                Err(e) => Err(e),
            },
            write_result = &mut write => match write_result {
                Err(e) => {
                    error!(error = %e, "Failed to write work response");
                    Err(e)
                }
                Ok(()) => dispatch.await,
            },
        };

        info!("Work request stream closed");
        result.map_err(WorkerError::Protocol)
    }

    async fn dispatch_requests<R>(
        &self,
        reader: &mut R,
        tx: mpsc::Sender<WorkResponse>,
    ) -> io::Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let mut in_flight = JoinSet::new();
        let result = loop {
            let request = match read_delimited::<WorkRequest, _>(reader).await {
                Ok(Some(request)) => request,
                Ok(None) => break Ok(()),
                Err(e) => {
                    error!(error = %e, "Failed to read work request");
                    break Err(e);
                }
            };

            if request.cancel {
                info!(request_id = request.request_id, "Received cancel request");
                let response = WorkResponse {
                    request_id: request.request_id,
                    was_cancelled: true,
                    ..Default::default()
                };
                if tx.send(response).await.is_err() {
                    warn!(request_id = request.request_id, "Response writer closed");
                }
                continue;
            }

            let tx = tx.clone();
            let handler = RequestHandler {
                context: self.context.clone(),
                work: self.work.clone(),
                working_dir: self.working_dir.clone(),
            };
            in_flight.spawn(async move {
                let request_id = request.request_id;
                let response = handler.handle(request).await;
                if tx.send(response).await.is_err() {
                    warn!(request_id, "Response writer closed");
                }
            });
        };

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Request dispatch failed");
            }
        }
        result
    }
}

/// Everything needed to answer one request off the read loop.
struct RequestHandler {
    context: WorkerContext,
    work: Arc<dyn Work>,
    working_dir: PathBuf,
}

impl RequestHandler {
    async fn handle(self, request: WorkRequest) -> WorkResponse {
        let request_id = request.request_id;
        let granularity = if request.verbosity > 0 {
            Granularity::Debug
        } else {
            self.context.granularity()
        };
        let dir = if request.sandbox_dir.is_empty() {
            self.working_dir.clone()
        } else {
            self.working_dir.join(&request.sandbox_dir)
        };

        debug!(request_id, dir = %dir.display(), "Dispatching work request");
        let context = self.context;
        let work = self.work;
        let args = request.arguments;
        let joined = tokio::task::spawn_blocking(move || {
            context.do_task_with(&dir, &format!("request {request_id}"), granularity, |ctx| {
                work.invoke(ctx, &args)
            })
        })
        .await;

        match joined {
            Ok(result) => WorkResponse {
                exit_code: result.status,
                output: result.log.text(),
                request_id,
                was_cancelled: false,
            },
            Err(e) => {
                let output = if e.is_cancelled() {
                    "ERROR: Interrupted".to_string()
                } else {
                    format!("ERROR: unexpected exception: {e}")
                };
                error!(request_id, error = %e, "Work request failed outside its task");
                WorkResponse {
                    exit_code: 1,
                    output,
                    request_id,
                    was_cancelled: false,
                }
            }
        }
    }
}

async fn write_responses<W>(mut writer: W, mut rx: mpsc::Receiver<WorkResponse>) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        debug!(
            request_id = response.request_id,
            exit_code = response.exit_code,
            "Writing work response"
        );
        write_delimited(&mut writer, &response).await?;
    }
    Ok(())
}
