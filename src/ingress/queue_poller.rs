// Copyright 2025 OpenObserve Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Long-polls an SQS-compatible queue. Each message body is parsed as an
//! SNS-Notification envelope; a message is deleted only once its alert has
//! been handed to the processor, so a crash mid-poll just re-delivers it.

use std::sync::Arc;

use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use config::rules;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::service::chat::ChatClient;
use crate::service::normalize::queue::{self, SnsEnvelope};
use crate::service::processor::Processor;

pub async fn run<C: ChatClient + 'static>(processor: Arc<Processor<C>>, shutdown: CancellationToken) {
    let cfg = config::get_config();
    if cfg.queue.url.is_empty() {
        log::info!("component=queue_poller event=disabled");
        return;
    }

    let region = if cfg.queue.region.is_empty() {
        region_from_url(&cfg.queue.url)
    } else {
        Some(cfg.queue.region.clone())
    };

    let region_provider = RegionProviderChain::first_try(region.map(aws_sdk_sqs::config::Region::new))
        .or_default_provider();
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .load()
        .await;
    let client = aws_sdk_sqs::Client::new(&sdk_config);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            result = poll_once(&client, &cfg.queue.url, cfg.queue.wait_time_secs, cfg.queue.batch_size) => {
                let messages = match result {
                    Ok(messages) => messages,
                    Err(e) => {
                        log::error!("component=queue_poller event=poll_error error={e}");
                        continue;
                    }
                };
                for message in messages {
                    handle_message(&client, &cfg.queue.url, message, processor.clone()).await;
                }
            }
        }
    }
}

async fn poll_once(
    client: &aws_sdk_sqs::Client,
    queue_url: &str,
    wait_time_secs: i32,
    batch_size: i32,
) -> Result<Vec<aws_sdk_sqs::types::Message>, aws_sdk_sqs::error::SdkError<aws_sdk_sqs::operation::receive_message::ReceiveMessageError>> {
    let resp = client
        .receive_message()
        .queue_url(queue_url)
        .wait_time_seconds(wait_time_secs)
        .max_number_of_messages(batch_size)
        .send()
        .await?;
    Ok(resp.messages.unwrap_or_default())
}

async fn handle_message<C: ChatClient + 'static>(
    client: &aws_sdk_sqs::Client,
    queue_url: &str,
    message: aws_sdk_sqs::types::Message,
    processor: Arc<Processor<C>>,
) {
    let Some(body) = message.body() else { return };
    let envelope: SnsEnvelope = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("component=queue_poller event=parse_error error={e}");
            return;
        }
    };

    let alert = queue::normalize(envelope, rules::get_rule);
    processor.process(alert).await;

    if let Some(receipt_handle) = message.receipt_handle() {
        if let Err(e) = client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
        {
            log::error!("component=queue_poller event=delete_error error={e}");
        }
    }
}

fn region_from_url(queue_url: &str) -> Option<String> {
    let parsed = Url::parse(queue_url).ok()?;
    let host = parsed.host_str()?;
    host.split('.').nth(1).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_from_url_parses_sqs_host() {
        let region = region_from_url("https://sqs.us-east-1.amazonaws.com/123456789012/my-queue");
        assert_eq!(region, Some("us-east-1".to_string()));
    }
}
