//! SeaORM adapter for the phrase catalog - generic over ConnectionTrait.

use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect,
};

use crate::entities::{phrase_tags, phrases, tags};

// Adapter functions return DbErr; repos layer maps to DomainError via From<DbErr>.

/// Draw up to `limit` distinct phrases tagged with any of `tag_ids`,
/// excluding `exclude`, in random order.
///
/// `RANDOM()` is understood by both Postgres and SQLite, so the draw
/// happens in the database without loading the whole catalog.
pub async fn draw_random<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    tag_ids: &[i64],
    exclude: &[String],
    limit: u64,
) -> Result<Vec<phrases::Model>, sea_orm::DbErr> {
    let random: SimpleExpr = Expr::cust("RANDOM()").into();
    phrases::Entity::find()
        .inner_join(phrase_tags::Entity)
        .filter(phrase_tags::Column::TagId.is_in(tag_ids.iter().copied()))
        .filter(phrases::Column::Phrase.is_not_in(exclude.iter().map(String::as_str)))
        .distinct()
        .order_by(random, Order::Asc)
        .limit(limit)
        .all(conn)
        .await
}

pub async fn find_tags_by_names<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    names: &[String],
) -> Result<Vec<tags::Model>, sea_orm::DbErr> {
    tags::Entity::find()
        .filter(tags::Column::Name.is_in(names.iter().map(String::as_str)))
        .all(conn)
        .await
}
