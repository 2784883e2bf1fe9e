use std::future::Future;

use docchat_core::backend::{BackendClient, BackendResult};
use docchat_core::core::{AskRequest, RequestFailure, UploadRequest};
use tokio_util::sync::CancellationToken;

use crate::events::UiEvent;

/// Detail reported for a request abandoned because a newer selection replaced it.
const CANCELLED: &str = "Request cancelled.";

/// Awaits `call` unless `cancel` fires first.
async fn cancellable<T>(
    call: impl Future<Output = BackendResult<T>>,
    cancel: Option<CancellationToken>,
) -> Result<T, RequestFailure> {
    let Some(cancel) = cancel else {
        return call.await.map_err(RequestFailure::from);
    };
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(RequestFailure::with_detail(CANCELLED)),
        result = call => result.map_err(RequestFailure::from),
    }
}

pub async fn upload(
    client: BackendClient,
    request: UploadRequest,
    cancel: Option<CancellationToken>,
) -> UiEvent {
    let UploadRequest {
        ticket,
        attachments,
    } = request;
    tracing::info!(files = attachments.len(), "uploading documents");
    let result = cancellable(client.upload(&attachments), cancel).await;
    UiEvent::UploadFinished { ticket, result }
}

pub async fn ask(
    client: BackendClient,
    request: AskRequest,
    cancel: Option<CancellationToken>,
) -> UiEvent {
    let AskRequest { ticket, question } = request;
    tracing::info!(session = %ticket.session, "asking question");
    let result = cancellable(client.ask(&ticket.session, &question), cancel).await;
    UiEvent::AskFinished { ticket, result }
}

#[cfg(test)]
mod tests {
    use docchat_core::config::Config;
    use docchat_core::core::Controller;
    use docchat_core::files::RawFile;

    use super::*;

    #[tokio::test]
    async fn test_cancelled_upload_reports_failure_with_ticket() {
        let mut controller = Controller::new();
        let request = controller
            .select_files(vec![RawFile::new("/nowhere/a.png", "image/png", 1)])
            .unwrap();
        let expected = request.ticket;
        let client = BackendClient::new(&Config::default()).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let event = upload(client, request, Some(cancel)).await;

        match event {
            UiEvent::UploadFinished { ticket, result } => {
                assert_eq!(ticket, expected);
                assert_eq!(result, Err(RequestFailure::with_detail(CANCELLED)));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
