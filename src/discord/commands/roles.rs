// Reaction role setup.

use super::{require, BotContext};
use crate::core::commands::{CommandCall, CommandError, CommandHandler};
use crate::core::platform::Permission;
use async_trait::async_trait;

/// Post the message members react to for roles, pre-seeded with every bound
/// emoji.
///
/// The binder listens to the message id from the configuration, so the id of
/// the new message is logged for the operator to copy into
/// `REACTION_ROLE_MESSAGE_ID`.
pub struct SetupRoles;

#[async_trait]
impl CommandHandler<BotContext> for SetupRoles {
    async fn execute(&self, call: CommandCall<'_, BotContext>) -> Result<(), CommandError> {
        require(&call, Permission::Administrator)?;
        let guild_id = call.guild_id()?;
        let roles = &call.context.config.reaction_roles.roles;

        let names = call.platform.role_names(guild_id).await?;
        let mut content = String::from("React to get a role\n");
        // Roles that no longer exist are left off the list.
        for (emoji, role_id) in roles {
            if let Some(name) = names.get(role_id) {
                content.push_str(&format!("{} → {}\n", emoji, name));
            }
        }

        let message = call.say(&content).await?;
        for (emoji, _) in roles {
            call.platform
                .react(call.invocation.channel_id, message.id, emoji)
                .await?;
        }

        tracing::info!(
            message_id = message.id,
            "Reaction role message created; set REACTION_ROLE_MESSAGE_ID to this id"
        );
        call.say("Reaction role message created.").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::commands::DispatchOutcome;
    use crate::core::config::BotConfig;
    use crate::core::platform::Permission;
    use crate::core::reaction_roles::ReactionRoleBinding;
    use crate::discord::commands::test_harness::{Harness, CHANNEL};
    use crate::test_support::Recorded;

    const ADMIN: &[Permission] = &[Permission::Administrator];

    fn harness() -> Harness {
        Harness::with_config(BotConfig {
            reaction_roles: ReactionRoleBinding {
                message_id: None,
                roles: vec![("😀".to_string(), 10), ("🎮".to_string(), 20)],
            },
            ..BotConfig::default()
        })
    }

    #[tokio::test]
    async fn only_administrators_may_set_up() {
        let harness = harness();

        let moderator = [Permission::ManageMessages];
        let outcome = harness.run("!setuproles", &moderator).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Rejected {
                name: "setuproles".to_string()
            }
        );
        assert_eq!(harness.platform.role_fetches(), 0);
    }

    #[tokio::test]
    async fn posts_known_roles_and_seeds_reactions() {
        let harness = harness();
        harness.platform.add_role_name(10, "Smiley");
        let message_id = harness.platform.peek_next_id();

        harness.run("!setuproles", ADMIN).await;

        let recorded = harness.platform.recorded();
        assert_eq!(
            recorded[0],
            Recorded::Sent {
                channel_id: CHANNEL,
                content: "React to get a role\n😀 → Smiley\n".to_string(),
            }
        );
        assert_eq!(
            recorded[1],
            Recorded::Reacted {
                channel_id: CHANNEL,
                message_id,
                emoji: "😀".to_string(),
            }
        );
        assert_eq!(
            recorded[2],
            Recorded::Reacted {
                channel_id: CHANNEL,
                message_id,
                emoji: "🎮".to_string(),
            }
        );
        assert_eq!(
            recorded[3],
            Recorded::Sent {
                channel_id: CHANNEL,
                content: "Reaction role message created.".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn role_list_is_fetched_once() {
        let harness = harness();
        harness.platform.add_role_name(10, "Smiley");
        harness.platform.add_role_name(20, "Gamer");

        harness.run("!setuproles", ADMIN).await;

        assert_eq!(harness.platform.role_fetches(), 1);
        assert_eq!(
            harness.platform.messages()[0],
            "React to get a role\n😀 → Smiley\n🎮 → Gamer\n"
        );
    }
}
