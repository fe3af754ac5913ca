use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, QueryOrder, Select};

use super::timestamps;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub number: i32,
    pub order_id: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Orders,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Entity {
    /// Items of one order, most recently updated first.
    pub fn find_by_order(order_id: i32) -> Select<Entity> {
        Self::order_newest_first(Self::find().filter(Column::OrderId.eq(order_id)))
    }

    /// Default ordering of an order's items. Equal timestamps fall back to
    /// insertion order.
    pub fn order_newest_first(select: Select<Entity>) -> Select<Entity> {
        select
            .order_by_desc(Column::UpdatedAt)
            .order_by_asc(Column::Id)
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let changed = self.is_changed();
        timestamps::stamp(&mut self.created_at, &mut self.updated_at, insert, changed);
        Ok(self)
    }
}
