use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub avatar_url: Option<String>,
    pub role: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::social_link::Entity")]
    SocialLink,
    #[sea_orm(has_many = "super::custom_link::Entity")]
    CustomLink,
    #[sea_orm(has_many = "super::profile_view::Entity")]
    ProfileView,
}

impl Related<super::social_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SocialLink.def()
    }
}

impl Related<super::custom_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomLink.def()
    }
}

impl Related<super::profile_view::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProfileView.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
