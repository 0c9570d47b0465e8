use sea_orm::entity::prelude::*;

/// One address row per user, created inside the registration transaction.
/// Optional fields the client left out are stored as NULL.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "addresses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub email: String,

    pub country: Option<String>,

    pub street: Option<String>,

    pub city: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
