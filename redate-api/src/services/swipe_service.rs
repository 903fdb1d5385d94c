use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::models::{NewSwipe, NewUndoEvent, Swipe, SwipeAction};
use crate::schema::{swipes, undo_events};

/// The decision ledger: at most one row per (swiper, swiped) ordered pair,
/// enforced by a unique constraint. Rows are only ever removed by undo.

pub fn find_decision(
    conn: &mut PgConnection,
    actor_id: Uuid,
    target_id: Uuid,
) -> QueryResult<Option<Swipe>> {
    swipes::table
        .filter(swipes::swiper_id.eq(actor_id))
        .filter(swipes::swiped_id.eq(target_id))
        .first::<Swipe>(conn)
        .optional()
}

pub fn record(
    conn: &mut PgConnection,
    actor_id: Uuid,
    target_id: Uuid,
    action: SwipeAction,
) -> QueryResult<Swipe> {
    let new_swipe = NewSwipe {
        swiper_id: actor_id,
        swiped_id: target_id,
        action: action.to_string(),
    };

    diesel::insert_into(swipes::table)
        .values(&new_swipe)
        .get_result::<Swipe>(conn)
}

/// The actor's most recent decision, if any. Undo only ever targets this row.
pub fn latest(conn: &mut PgConnection, actor_id: Uuid) -> QueryResult<Option<Swipe>> {
    swipes::table
        .filter(swipes::swiper_id.eq(actor_id))
        .order(swipes::created_at.desc())
        .first::<Swipe>(conn)
        .optional()
}

pub fn delete_by_id(conn: &mut PgConnection, swipe_id: Uuid) -> QueryResult<usize> {
    diesel::delete(swipes::table.find(swipe_id)).execute(conn)
}

pub fn count_in_window(
    conn: &mut PgConnection,
    actor_id: Uuid,
    action: SwipeAction,
    window: (DateTime<Utc>, DateTime<Utc>),
) -> QueryResult<i64> {
    swipes::table
        .filter(swipes::swiper_id.eq(actor_id))
        .filter(swipes::action.eq(action.to_string()))
        .filter(swipes::created_at.ge(window.0))
        .filter(swipes::created_at.lt(window.1))
        .count()
        .get_result(conn)
}

/// Undo usage lives in its own ledger, not the swipe table: the undone
/// swipe row is deleted, so it cannot carry the count itself.
pub fn count_undos_in_window(
    conn: &mut PgConnection,
    actor_id: Uuid,
    window: (DateTime<Utc>, DateTime<Utc>),
) -> QueryResult<i64> {
    undo_events::table
        .filter(undo_events::user_id.eq(actor_id))
        .filter(undo_events::created_at.ge(window.0))
        .filter(undo_events::created_at.lt(window.1))
        .count()
        .get_result(conn)
}

pub fn record_undo(conn: &mut PgConnection, actor_id: Uuid) -> QueryResult<usize> {
    diesel::insert_into(undo_events::table)
        .values(&NewUndoEvent { user_id: actor_id })
        .execute(conn)
}
