use uuid::Uuid;

use redate_shared::clients::rabbitmq::RabbitMQClient;
use redate_shared::types::event::{payloads, routing_keys, Event};
use redate_shared::types::NotificationTemplate;

use crate::models::{Match, Report};

const SOURCE: &str = "redate-api";

/// Notify the other party about a freshly created match. The push relay
/// consumes the rendered template; delivery is fire-and-forget.
pub async fn publish_match_created(
    rabbitmq: &RabbitMQClient,
    matched: &Match,
    recipient_id: Uuid,
    template: NotificationTemplate,
) {
    let event = Event::new(
        SOURCE,
        routing_keys::MATCH_CREATED,
        payloads::MatchCreated {
            match_id: matched.id,
            user_a_id: matched.user_a_id,
            user_b_id: matched.user_b_id,
            recipient_id,
            template: template.kind().to_string(),
            title: template.title().to_string(),
            body: template.body().to_string(),
        },
    )
    .with_user(recipient_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MATCH_CREATED, &event).await {
        tracing::error!(error = %e, match_id = %matched.id, "failed to publish match.created event");
    }
}

pub async fn publish_match_unmatched(rabbitmq: &RabbitMQClient, matched: &Match, actor_id: Uuid) {
    let event = Event::new(
        SOURCE,
        routing_keys::MATCH_UNMATCHED,
        payloads::MatchUnmatched {
            match_id: matched.id,
            user_a_id: matched.user_a_id,
            user_b_id: matched.user_b_id,
            actor_id,
        },
    )
    .with_user(actor_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MATCH_UNMATCHED, &event).await {
        tracing::error!(error = %e, match_id = %matched.id, "failed to publish match.unmatched event");
    }
}

pub async fn publish_swipe_undone(
    rabbitmq: &RabbitMQClient,
    actor_id: Uuid,
    target_id: Uuid,
    match_removed: bool,
) {
    let event = Event::new(
        SOURCE,
        routing_keys::SWIPE_UNDONE,
        payloads::SwipeUndone {
            actor_id,
            target_id,
            match_removed,
        },
    )
    .with_user(actor_id);

    if let Err(e) = rabbitmq.publish(routing_keys::SWIPE_UNDONE, &event).await {
        tracing::error!(error = %e, actor_id = %actor_id, "failed to publish swipe.undone event");
    }
}

pub async fn publish_match_reported(rabbitmq: &RabbitMQClient, report: &Report) {
    let event = Event::new(
        SOURCE,
        routing_keys::MATCH_REPORTED,
        payloads::MatchReported {
            report_id: report.id,
            reporter_id: report.reporter_id,
            reported_id: report.reported_id,
            match_id: report.match_id,
            reason: report.reason.clone(),
        },
    )
    .with_user(report.reporter_id);

    if let Err(e) = rabbitmq.publish(routing_keys::MATCH_REPORTED, &event).await {
        tracing::error!(error = %e, report_id = %report.id, "failed to publish match.reported event");
    }
}
