// Gateway event handler.
//
// Converts serenity events into core inputs: messages feed leveling and the
// command dispatcher, joins trigger the welcome flow, reaction toggles go to
// the reaction role binder.

pub mod welcome;

use crate::core::commands::{parse_command, DispatchOutcome, Invocation};
use crate::core::platform::{Permission, PermissionSet};
use crate::core::reaction_roles::{ReactionEvent, RoleChange};
use crate::discord::leveling::announce_level_up;
use crate::discord::platform::{emoji_key, snowflake_time};
use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

/// Event handler for everything that isn't a poise command.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            tracing::info!("Logged in as {}", data_about_bot.user.name);
        }
        serenity::FullEvent::Message { new_message } => {
            handle_message(ctx, new_message, data).await;
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            if !new_member.user.bot {
                welcome::greet_member(
                    data.platform.as_ref(),
                    &data.bot.config,
                    new_member.user.id.get(),
                )
                .await;
            }
        }
        serenity::FullEvent::ReactionAdd { add_reaction } => {
            handle_reaction(ctx, add_reaction, data, true).await;
        }
        serenity::FullEvent::ReactionRemove { removed_reaction } => {
            handle_reaction(ctx, removed_reaction, data, false).await;
        }
        _ => {}
    }

    Ok(())
}

/// Adapt a gateway message into an `Invocation` and run it.
async fn handle_message(ctx: &serenity::Context, message: &serenity::Message, data: &Data) {
    // Permissions cost a member lookup, so only resolve them for commands.
    let prefix = &data.bot.config.prefix;
    let is_command = parse_command(&message.content, prefix).is_some();
    let permissions = if is_command && !message.author.bot {
        author_permissions(ctx, message).await
    } else {
        PermissionSet::default()
    };

    let invocation = Invocation {
        guild_id: message.guild_id.map(|id| id.get()),
        channel_id: message.channel_id.get(),
        message_id: message.id.get(),
        author_id: message.author.id.get(),
        author_is_bot: message.author.bot,
        content: message.content.clone(),
        mentions: message
            .mentions
            .iter()
            .map(|user| user.id.get())
            .collect(),
        permissions,
        created_at: snowflake_time(message.id.get()),
    };

    on_message(data, &invocation).await;
}

/// Award XP for the message, announce a level up in its channel, then run it
/// as a command. Bot authors (including us) are skipped entirely.
///
/// A failed XP write is logged and the message still reaches the dispatcher.
pub async fn on_message(data: &Data, invocation: &Invocation) -> Option<DispatchOutcome> {
    if invocation.author_is_bot {
        return None;
    }

    let user_id = invocation.author_id;
    match data.bot.leveling.process_message(user_id).await {
        Ok(Some(level_up)) => {
            tracing::info!(
                user_id,
                new_level = level_up.new_level,
                carried_xp = level_up.carried_xp,
                "User leveled up"
            );
            let platform = data.platform.as_ref();
            if let Err(e) = announce_level_up(platform, invocation.channel_id, &level_up).await {
                tracing::warn!("Failed to announce level up: {}", e);
            }
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(user_id, "Failed to record XP: {}", e);
        }
    }

    let outcome = data.dispatcher.dispatch(invocation).await;
    tracing::debug!(user_id, ?outcome, "Message dispatched");
    Some(outcome)
}

/// The author's guild permissions. Empty outside guilds or when the member
/// can't be resolved.
async fn author_permissions(ctx: &serenity::Context, message: &serenity::Message) -> PermissionSet {
    let Some(guild_id) = message.guild_id else {
        return PermissionSet::default();
    };

    let member = match message.member(ctx).await {
        Ok(member) => member,
        Err(e) => {
            tracing::warn!(
                user_id = message.author.id.get(),
                "Failed to resolve command author: {}",
                e
            );
            return PermissionSet::default();
        }
    };

    let granted = ctx
        .cache
        .guild(guild_id)
        .map(|guild| guild.member_permissions(&member));

    match granted {
        Some(granted) => to_permission_set(granted),
        None => {
            tracing::warn!(guild_id = guild_id.get(), "Guild missing from cache");
            PermissionSet::default()
        }
    }
}

fn to_permission_set(granted: serenity::Permissions) -> PermissionSet {
    let table = [
        (serenity::Permissions::KICK_MEMBERS, Permission::KickMembers),
        (serenity::Permissions::BAN_MEMBERS, Permission::BanMembers),
        (serenity::Permissions::MODERATE_MEMBERS, Permission::ModerateMembers),
        (serenity::Permissions::MANAGE_MESSAGES, Permission::ManageMessages),
        (serenity::Permissions::ADMINISTRATOR, Permission::Administrator),
    ];

    PermissionSet::new(
        table
            .into_iter()
            .filter(|(flag, _)| granted.contains(*flag))
            .map(|(_, permission)| permission),
    )
}

async fn handle_reaction(
    ctx: &serenity::Context,
    reaction: &serenity::Reaction,
    data: &Data,
    added: bool,
) {
    let Some(user_id) = reaction.user_id else {
        return;
    };
    // Cheap early exit before any lookups.
    if data.reaction_roles.binding().message_id != Some(reaction.message_id.get()) {
        return;
    }

    let user_is_bot = match &reaction.member {
        Some(member) => member.user.bot,
        None => match reaction.user(ctx).await {
            Ok(user) => user.bot,
            Err(e) => {
                tracing::warn!(
                    user_id = user_id.get(),
                    "Failed to resolve reacting user: {}",
                    e
                );
                return;
            }
        },
    };

    let event = ReactionEvent {
        guild_id: reaction.guild_id.map(|id| id.get()),
        message_id: reaction.message_id.get(),
        emoji: emoji_key(&reaction.emoji),
        user_id: user_id.get(),
        user_is_bot,
    };

    let result = if added {
        data.reaction_roles.reaction_added(&event).await
    } else {
        data.reaction_roles.reaction_removed(&event).await
    };

    match result {
        Ok(RoleChange::Granted { user_id, role_id }) => {
            tracing::info!(user_id, role_id, "Reaction role granted");
        }
        Ok(RoleChange::Revoked { user_id, role_id }) => {
            tracing::info!(user_id, role_id, "Reaction role revoked");
        }
        Ok(RoleChange::Ignored(reason)) => {
            tracing::debug!(user_id = event.user_id, ?reason, "Reaction ignored");
        }
        Err(e) => {
            tracing::error!(
                user_id = event.user_id,
                emoji = %event.emoji,
                "Failed to update reaction role: {}",
                e
            );
        }
    }
}
