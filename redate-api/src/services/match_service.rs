use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::DecoratableTarget;
use uuid::Uuid;

use crate::models::{Match, NewMatch, Swipe};
use crate::schema::{matches, swipes};

/// Actions that count toward mutuality. A like answered by a superlike
/// still matches.
const POSITIVE_ACTIONS: [&str; 2] = ["like", "superlike"];

/// Matches are stored once per unordered pair, sorted by id.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub fn find_active(conn: &mut PgConnection, a: Uuid, b: Uuid) -> QueryResult<Option<Match>> {
    let (a, b) = canonical_pair(a, b);
    matches::table
        .filter(matches::user_a_id.eq(a))
        .filter(matches::user_b_id.eq(b))
        .filter(matches::is_unmatched.eq(false))
        .first::<Match>(conn)
        .optional()
}

/// After a positive decision actor -> target, create the match if the
/// reverse positive decision exists.
///
/// The insert is conflict-tolerant against the partial unique index on the
/// canonical pair: when both users swipe at the same time, the losing writer
/// observes zero inserted rows and returns the row the winner created.
/// Returns `(match, created)`; `None` when no mutual positive exists.
pub fn resolve_mutual(
    conn: &mut PgConnection,
    actor_id: Uuid,
    target_id: Uuid,
) -> QueryResult<Option<(Match, bool)>> {
    let reverse: Option<Swipe> = swipes::table
        .filter(swipes::swiper_id.eq(target_id))
        .filter(swipes::swiped_id.eq(actor_id))
        .filter(swipes::action.eq_any(POSITIVE_ACTIONS))
        .first::<Swipe>(conn)
        .optional()?;

    if reverse.is_none() {
        return Ok(None);
    }

    let (a, b) = canonical_pair(actor_id, target_id);
    let inserted: Option<Match> = diesel::insert_into(matches::table)
        .values(&NewMatch { user_a_id: a, user_b_id: b })
        .on_conflict((matches::user_a_id, matches::user_b_id))
        .filter_target(matches::is_unmatched.eq(false))
        .do_nothing()
        .get_result::<Match>(conn)
        .optional()?;

    match inserted {
        Some(m) => Ok(Some((m, true))),
        None => Ok(find_active(conn, a, b)?.map(|m| (m, false))),
    }
}

/// Soft-close a match. Reopening is not supported; a fresh mutual like has
/// to create a new row.
pub fn close(conn: &mut PgConnection, match_id: Uuid) -> QueryResult<Match> {
    diesel::update(matches::table.find(match_id))
        .set((
            matches::is_unmatched.eq(true),
            matches::unmatched_at.eq(Utc::now()),
        ))
        .get_result::<Match>(conn)
}

/// Soft-close the active match between two users, if one exists. Used by
/// undo to de-create the match a reverted swipe triggered.
pub fn close_active_between(
    conn: &mut PgConnection,
    a: Uuid,
    b: Uuid,
) -> QueryResult<Option<Match>> {
    match find_active(conn, a, b)? {
        Some(m) => close(conn, m.id).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_is_sorted() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
        let (lo, hi) = canonical_pair(a, b);
        assert!(lo <= hi);
    }

    #[test]
    fn canonical_pair_of_equal_ids_is_identity() {
        let a = Uuid::new_v4();
        assert_eq!(canonical_pair(a, a), (a, a));
    }

    #[test]
    fn positive_actions_cover_like_and_superlike_only() {
        assert!(POSITIVE_ACTIONS.contains(&"like"));
        assert!(POSITIVE_ACTIONS.contains(&"superlike"));
        assert!(!POSITIVE_ACTIONS.contains(&"dislike"));
    }
}
