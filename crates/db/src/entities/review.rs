//! Review entity (a star rating plus comment on a catalog book).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// External catalog volume ID
    #[sea_orm(indexed)]
    pub book_id: String,

    /// Author
    #[sea_orm(indexed)]
    pub user_id: String,

    pub user_name: String,

    /// 1..=5
    pub rating: i16,

    #[sea_orm(column_type = "Text")]
    pub comment: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(default_value = 0)]
    pub upvotes: i32,

    #[sea_orm(default_value = 0)]
    pub downvotes: i32,

    /// Bumped on every vote write; guards the read-modify-write in `save_vote`
    #[sea_orm(default_value = 0)]
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(has_many = "super::review_vote::Entity")]
    Votes,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::review_vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
