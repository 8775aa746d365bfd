use crate::reveal::FileManager;
use dirlens_listing::ScanContext;
use dirlens_protocol::{ErrorCode, ErrorEnvelope, Request, Response, ResponseData};
use std::path::Path;
use std::sync::Arc;

/// Answers protocol requests against one shared [`ScanContext`].
pub struct RequestHandler {
    context: Arc<ScanContext>,
    file_manager: Arc<dyn FileManager>,
}

impl RequestHandler {
    pub fn new(context: Arc<ScanContext>, file_manager: Arc<dyn FileManager>) -> Self {
        Self {
            context,
            file_manager,
        }
    }

    pub fn context(&self) -> &Arc<ScanContext> {
        &self.context
    }

    pub async fn handle_line(&self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request).await,
            Err(err) => Response::error(ErrorEnvelope::new(
                ErrorCode::InvalidRequest,
                format!("Invalid request: {err}"),
            )),
        }
    }

    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::List { path } => match self.context.get_listing(Path::new(&path)).await {
                Ok(listing) => Response::ok(ResponseData::Listing(listing)),
                Err(err) => {
                    log::warn!("Listing {path} failed: {err}");
                    Response::error(err.to_envelope())
                }
            },
            Request::Status => Response::ok(ResponseData::Status(self.context.scan_status())),
            Request::Reveal { path } => self.reveal(path).await,
        }
    }

    async fn reveal(&self, path: String) -> Response {
        let file_manager = Arc::clone(&self.file_manager);
        let outcome = tokio::task::spawn_blocking(move || file_manager.reveal(&path)).await;
        match outcome {
            Ok(Ok(reveal)) => Response::ok(ResponseData::Reveal { reveal }),
            Ok(Err(err)) => Response::error(ErrorEnvelope::new(
                ErrorCode::Internal,
                format!("Reveal failed: {err}"),
            )),
            Err(err) => Response::error(ErrorEnvelope::new(
                ErrorCode::Internal,
                format!("Reveal worker failed: {err}"),
            )),
        }
    }
}
