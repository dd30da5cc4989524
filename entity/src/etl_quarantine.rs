use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "etl_quarantine")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub run_id: i32,
    pub order_id: String,
    pub order_item_id: i32,
    /// JSON array of tagged quarantine reasons
    pub reasons: String,
    /// JSON snapshot of the rejected candidate
    pub payload: String,
    pub quarantined_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::etl_run::Entity",
        from = "Column::RunId",
        to = "super::etl_run::Column::Id"
    )]
    EtlRun,
}

impl Related<super::etl_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EtlRun.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
