use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use tokio::time::sleep;

use crate::{error::CatalogError, warning};

/// Attempts per request, including the first one.
pub const MAX_ATTEMPTS: u32 = 3;
/// Delay before retrying a gateway error or a dropped connection.
pub const RETRY_DELAY: Duration = Duration::from_secs(10);
/// Longest `Retry-After` we are willing to wait for.
pub const MAX_RETRY_AFTER_SECS: u64 = 120;

/// Sends a request, retrying transient failures.
///
/// Gateway errors (502, 503, 504) and connect/timeout errors are retried after
/// [`RETRY_DELAY`]. `429 Too Many Requests` is retried after the `Retry-After`
/// header if it is at most [`MAX_RETRY_AFTER_SECS`]. 401 and 403 become
/// [`CatalogError::Auth`], any other error status becomes [`CatalogError::Api`].
pub async fn send(request: RequestBuilder) -> Result<Response, CatalogError> {
    let mut attempt = 1;

    loop {
        let Some(current) = request.try_clone() else {
            // streaming bodies cannot be replayed
            return check_status(request.send().await?).await;
        };

        let response = match current.send().await {
            Ok(resp) => resp,
            Err(err) if (err.is_connect() || err.is_timeout()) && attempt < MAX_ATTEMPTS => {
                warning!("Request failed ({}), retrying...", err);
                attempt += 1;
                sleep(RETRY_DELAY).await;
                continue;
            }
            Err(err) => return Err(CatalogError::Http(err)),
        };

        let status = response.status();
        if attempt < MAX_ATTEMPTS {
            if matches!(
                status,
                StatusCode::BAD_GATEWAY
                    | StatusCode::SERVICE_UNAVAILABLE
                    | StatusCode::GATEWAY_TIMEOUT
            ) {
                attempt += 1;
                sleep(RETRY_DELAY).await;
                continue;
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = retry_after_secs(&response).unwrap_or(1);
                if retry_after <= MAX_RETRY_AFTER_SECS {
                    attempt += 1;
                    sleep(Duration::from_secs(retry_after)).await;
                    continue;
                }
                warning!(
                    "Retry after has reached an abnormal high of {} seconds. Try again later.",
                    retry_after
                );
            }
        }

        return check_status(response).await;
    }
}

fn retry_after_secs(response: &Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
}

async fn check_status(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(CatalogError::Auth(format!("{} {}", status.as_u16(), message)));
    }

    Err(CatalogError::Api {
        status: status.as_u16(),
        message,
    })
}
