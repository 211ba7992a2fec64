use std::{slice, sync::Arc};

use async_trait::async_trait;
use twilight_http::Client;
use twilight_model::{
    channel::Message,
    guild::Permissions,
    id::{
        Id,
        marker::{ChannelMarker, UserMarker},
    },
};

use rusty_menu::{
    Destination, MenuClient, MessageBody, MessageHandle, ReactionFeed, ReactionFilter, ReactionKey,
};

use crate::{parse::request_reaction_type, permissions::resolve_channel_permissions, reactions::ReactionHub};

/// `MenuClient` backed by the Discord HTTP API and the gateway reaction hub.
pub struct TwilightMenuClient {
    http: Arc<Client>,
    hub: Arc<ReactionHub>,
    bot_id: Id<UserMarker>,
}

impl TwilightMenuClient {
    pub fn new(http: Arc<Client>, hub: Arc<ReactionHub>, bot_id: Id<UserMarker>) -> Self {
        Self { http, hub, bot_id }
    }

    /// Look up the bot account and build a client for it.
    pub async fn connect(http: Arc<Client>, hub: Arc<ReactionHub>) -> anyhow::Result<Self> {
        let bot = http.current_user().await?.model().await?;
        Ok(Self::new(http, hub, bot.id))
    }

    pub fn hub(&self) -> &Arc<ReactionHub> {
        &self.hub
    }

    async fn channel_for(&self, destination: &Destination) -> anyhow::Result<Id<ChannelMarker>> {
        match destination {
            Destination::Channel(channel_id) | Destination::Direct(channel_id) => Ok(*channel_id),
            Destination::User(user_id) => {
                let channel = self
                    .http
                    .create_private_channel(*user_id)
                    .await?
                    .model()
                    .await?;
                Ok(channel.id)
            }
        }
    }
}

fn handle(message: &Message) -> MessageHandle {
    MessageHandle {
        channel_id: message.channel_id,
        message_id: message.id,
    }
}

#[async_trait]
impl MenuClient for TwilightMenuClient {
    fn current_user_id(&self) -> Id<UserMarker> {
        self.bot_id
    }

    async fn send(
        &self,
        destination: &Destination,
        body: &MessageBody,
    ) -> anyhow::Result<MessageHandle> {
        let channel_id = self.channel_for(destination).await?;

        let mut request = self
            .http
            .create_message(channel_id)
            .embeds(slice::from_ref(&body.embed));
        if !body.content.is_empty() {
            request = request.content(&body.content);
        }

        let message = request.await?.model().await?;
        Ok(handle(&message))
    }

    async fn edit(
        &self,
        message: &MessageHandle,
        body: &MessageBody,
    ) -> anyhow::Result<MessageHandle> {
        let content = (!body.content.is_empty()).then_some(body.content.as_str());

        let updated = self
            .http
            .update_message(message.channel_id, message.message_id)
            .content(content)
            .embeds(Some(slice::from_ref(&body.embed)))
            .await?
            .model()
            .await?;

        Ok(handle(&updated))
    }

    async fn delete(&self, message: &MessageHandle) -> anyhow::Result<()> {
        self.http
            .delete_message(message.channel_id, message.message_id)
            .await?;
        Ok(())
    }

    async fn add_reaction(&self, message: &MessageHandle, key: &ReactionKey) -> anyhow::Result<()> {
        self.http
            .create_reaction(
                message.channel_id,
                message.message_id,
                &request_reaction_type(key),
            )
            .await?;
        Ok(())
    }

    async fn remove_all_reactions(&self, message: &MessageHandle) -> anyhow::Result<()> {
        self.http
            .delete_all_reactions(message.channel_id, message.message_id)
            .await?;
        Ok(())
    }

    async fn remove_reaction_mark(
        &self,
        message: &MessageHandle,
        key: &ReactionKey,
        user_id: Id<UserMarker>,
    ) -> anyhow::Result<()> {
        let emoji = request_reaction_type(key);

        if user_id == self.bot_id {
            self.http
                .delete_current_user_reaction(message.channel_id, message.message_id, &emoji)
                .await?;
        } else {
            self.http
                .delete_reaction(message.channel_id, message.message_id, &emoji, user_id)
                .await?;
        }

        Ok(())
    }

    async fn subscribe_reaction_adds(
        &self,
        message: &MessageHandle,
        filter: ReactionFilter,
    ) -> anyhow::Result<ReactionFeed> {
        Ok(self.hub.subscribe(message.message_id, filter).await)
    }

    async fn channel_permissions(
        &self,
        channel_id: Id<ChannelMarker>,
    ) -> anyhow::Result<Option<Permissions>> {
        resolve_channel_permissions(&self.http, channel_id, self.bot_id).await
    }
}
