use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{custom_link, profile, profile_view, social_link};
use crate::models::profile::{
    CustomLink, NewCustomLink, NewSocialLink, OwnerState, Profile, ProfileBundle, ProfileFields,
    SocialLink,
};

use super::{LinkStore, StoreError};

#[derive(Clone)]
pub struct PgLinkStore {
    database: DatabaseConnection,
}

impl PgLinkStore {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

#[async_trait]
impl LinkStore for PgLinkStore {
    async fn load_public_profile(
        &self,
        username: &str,
    ) -> Result<Option<ProfileBundle>, StoreError> {
        if username.is_empty() {
            return Ok(None);
        }

        let txn = self.database.begin().await?;
        let found = profile::Entity::find()
            .filter(profile::Column::Username.eq(username))
            .one(&txn)
            .await?;

        let Some(model) = found else {
            txn.commit().await?;
            return Ok(None);
        };

        let (social_links, custom_links) = load_links(&txn, model.id).await?;
        txn.commit().await?;

        Ok(Some(ProfileBundle {
            profile: model.into(),
            social_links,
            custom_links,
        }))
    }

    async fn load_owner_state(&self, owner_id: Uuid) -> Result<OwnerState, StoreError> {
        let txn = self.database.begin().await?;
        let profile = profile::Entity::find_by_id(owner_id).one(&txn).await?;
        let (social_links, custom_links) = load_links(&txn, owner_id).await?;
        txn.commit().await?;

        Ok(OwnerState {
            profile: profile.map(Profile::from),
            social_links,
            custom_links,
        })
    }

    async fn update_profile(
        &self,
        owner_id: Uuid,
        fields: &ProfileFields,
    ) -> Result<(), StoreError> {
        let result = profile::Entity::update_many()
            .col_expr(
                profile::Column::Username,
                Expr::value(fields.stored_username()),
            )
            .col_expr(
                profile::Column::FirstName,
                Expr::value(fields.first_name.clone()),
            )
            .col_expr(
                profile::Column::LastName,
                Expr::value(fields.last_name.clone()),
            )
            .col_expr(profile::Column::Bio, Expr::value(fields.bio.clone()))
            .col_expr(
                profile::Column::Location,
                Expr::value(fields.location.clone()),
            )
            .col_expr(profile::Column::Phone, Expr::value(fields.phone.clone()))
            .col_expr(profile::Column::Email, Expr::value(fields.email.clone()))
            .col_expr(
                profile::Column::AvatarUrl,
                Expr::value(fields.avatar_url.clone()),
            )
            .filter(profile::Column::Id.eq(owner_id))
            .exec(&self.database)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound("Profile"));
        }
        Ok(())
    }

    async fn set_avatar_url(&self, owner_id: Uuid, avatar_url: &str) -> Result<(), StoreError> {
        let result = profile::Entity::update_many()
            .col_expr(
                profile::Column::AvatarUrl,
                Expr::value(avatar_url.to_string()),
            )
            .filter(profile::Column::Id.eq(owner_id))
            .exec(&self.database)
            .await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound("Profile"));
        }
        Ok(())
    }

    async fn insert_social_link(
        &self,
        owner_id: Uuid,
        link: NewSocialLink,
    ) -> Result<SocialLink, StoreError> {
        let model = social_link::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(owner_id),
            platform: ActiveValue::Set(link.platform),
            url: ActiveValue::Set(link.url),
            display_name: ActiveValue::Set(link.display_name),
            created_at: ActiveValue::Set(Utc::now().fixed_offset()),
        }
        .insert(&self.database)
        .await?;

        Ok(model.into())
    }

    async fn insert_custom_link(
        &self,
        owner_id: Uuid,
        link: NewCustomLink,
    ) -> Result<CustomLink, StoreError> {
        let model = custom_link::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            user_id: ActiveValue::Set(owner_id),
            title: ActiveValue::Set(link.title),
            url: ActiveValue::Set(link.url),
            created_at: ActiveValue::Set(Utc::now().fixed_offset()),
        }
        .insert(&self.database)
        .await?;

        Ok(model.into())
    }

    async fn delete_social_link(&self, owner_id: Uuid, link_id: Uuid) -> Result<(), StoreError> {
        let result = social_link::Entity::delete_many()
            .filter(social_link::Column::Id.eq(link_id))
            .filter(social_link::Column::UserId.eq(owner_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            debug!("Social link {link_id} already absent for {owner_id}");
        }
        Ok(())
    }

    async fn delete_custom_link(&self, owner_id: Uuid, link_id: Uuid) -> Result<(), StoreError> {
        let result = custom_link::Entity::delete_many()
            .filter(custom_link::Column::Id.eq(link_id))
            .filter(custom_link::Column::UserId.eq(owner_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            debug!("Custom link {link_id} already absent for {owner_id}");
        }
        Ok(())
    }

    async fn record_view(
        &self,
        profile_id: Uuid,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let event = profile_view::ActiveModel {
            id: ActiveValue::NotSet,
            profile_id: ActiveValue::Set(profile_id),
            viewed_at: ActiveValue::Set(viewed_at.fixed_offset()),
        };
        profile_view::Entity::insert(event)
            .exec(&self.database)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database.ping().await?;
        Ok(())
    }
}

async fn load_links<C: ConnectionTrait>(
    conn: &C,
    owner_id: Uuid,
) -> Result<(Vec<SocialLink>, Vec<CustomLink>), StoreError> {
    let social = social_link::Entity::find()
        .filter(social_link::Column::UserId.eq(owner_id))
        .order_by_asc(social_link::Column::CreatedAt)
        .all(conn)
        .await?;
    let custom = custom_link::Entity::find()
        .filter(custom_link::Column::UserId.eq(owner_id))
        .order_by_asc(custom_link::Column::CreatedAt)
        .all(conn)
        .await?;

    Ok((
        social.into_iter().map(SocialLink::from).collect(),
        custom.into_iter().map(CustomLink::from).collect(),
    ))
}

impl From<profile::Model> for Profile {
    fn from(model: profile::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            first_name: model.first_name,
            last_name: model.last_name,
            bio: model.bio,
            location: model.location,
            phone: model.phone,
            email: model.email,
            avatar_url: model.avatar_url,
        }
    }
}

impl From<social_link::Model> for SocialLink {
    fn from(model: social_link::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            platform: model.platform,
            url: model.url,
            display_name: model.display_name,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<custom_link::Model> for CustomLink {
    fn from(model: custom_link::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            url: model.url,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
