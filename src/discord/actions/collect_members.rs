// Member collection: page through the guild member list, render it to
// text + CSV exports, and either upload them or report where they landed.

use super::{markers, to_utc};
use crate::core::export::{member_csv, member_text, MemberRecord, UploadDecision};
use crate::discord::{Data, Error};
use chrono::Utc;
use poise::serenity_prelude as serenity;
use serenity::{CreateAttachment, CreateEmbed, CreateMessage};
use std::time::Duration;

pub struct MemberOutcome {
    pub member_count: usize,
    pub uploaded: usize,
    pub local_paths: Vec<String>,
}

/// Reaction-triggered entry point: owns the busy-guard and the status
/// markers on the triggering message.
pub async fn run_from_reaction(
    ctx: &serenity::Context,
    data: &Data,
    message: &serenity::Message,
) -> Result<(), Error> {
    let Some(guild_id) = message.guild_id else {
        message
            .reply(&ctx.http, "Member collection only works inside a server.")
            .await?;
        return Ok(());
    };

    let Some(_permit) = data.collection_guard.begin() else {
        message
            .reply(
                &ctx.http,
                "👁️ A collection is already in progress. Please wait for it to finish.",
            )
            .await?;
        return Ok(());
    };

    markers::mark_processing(ctx, message, &data.config).await;
    match run(ctx, data, message.channel_id, guild_id).await {
        Ok(_) => {
            markers::mark_outcome(ctx, message, &data.config, true).await;
            Ok(())
        }
        Err(e) => {
            tracing::error!("member collection failed: {e}");
            let _ = message
                .reply(&ctx.http, format!("Member collection failed: {e}"))
                .await;
            markers::mark_outcome(ctx, message, &data.config, false).await;
            Ok(())
        }
    }
}

/// The collection itself. Callers hold the busy-guard.
pub async fn run(
    ctx: &serenity::Context,
    data: &Data,
    channel_id: serenity::ChannelId,
    guild_id: serenity::GuildId,
) -> Result<MemberOutcome, Error> {
    let guild = ctx.http.get_guild(guild_id).await?;

    channel_id
        .say(
            &ctx.http,
            format!(
                "👁️ Collecting the member list of **{}**... this can take a while on large servers.",
                guild.name
            ),
        )
        .await?;

    let limits = &data.config.limits;
    let mut members: Vec<serenity::Member> = Vec::new();
    let mut after: Option<u64> = None;

    loop {
        let page = ctx
            .http
            .get_guild_members(guild_id, Some(limits.member_page_size), after)
            .await?;
        if page.is_empty() {
            break;
        }
        after = page.last().map(|m| m.user.id.get());
        let was_full_page = page.len() as u64 == limits.member_page_size;
        members.extend(page);

        if !was_full_page {
            break;
        }
        tracing::debug!("collected {} members so far", members.len());
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    // Role names sorted by position so "top role" means the highest one.
    let mut roles_by_position: Vec<&serenity::Role> = guild.roles.values().collect();
    roles_by_position.sort_by(|a, b| b.position.cmp(&a.position));

    let records: Vec<MemberRecord> = members
        .iter()
        .map(|m| {
            let role_names: Vec<String> = m
                .roles
                .iter()
                .filter_map(|rid| guild.roles.get(rid).map(|r| r.name.clone()))
                .collect();
            let top_role = roles_by_position
                .iter()
                .find(|r| m.roles.contains(&r.id))
                .map(|r| r.name.clone());

            MemberRecord {
                username: m.user.name.clone(),
                display_name: m.display_name().to_string(),
                user_id: m.user.id.get(),
                joined_at: m.joined_at.map(to_utc),
                created_at: to_utc(m.user.id.created_at()),
                is_bot: m.user.bot,
                roles: role_names,
                top_role,
                boosting_since: m.premium_since.map(to_utc),
            }
        })
        .collect();

    let collected_at = Utc::now();
    let stamp = collected_at.format("%Y%m%d_%H%M%S");
    let base = format!("guild_{}", guild_id.get());

    let text_file = data.exports.write(
        &format!("{base}_members_{stamp}.txt"),
        member_text(&guild.name, collected_at, &records).as_bytes(),
    )?;
    let csv_file = data.exports.write(
        &format!("{base}_members_{stamp}.csv"),
        member_csv(&records).as_bytes(),
    )?;

    let mut reply = CreateMessage::new();
    let mut uploaded = 0usize;
    let mut local_paths = Vec::new();
    for file in [&text_file, &csv_file] {
        match UploadDecision::for_size(file.size_bytes, limits.upload_limit_bytes) {
            UploadDecision::Upload => {
                reply = reply.add_file(CreateAttachment::path(&file.path).await?);
                uploaded += 1;
            }
            UploadDecision::LocalPathOnly => {
                local_paths.push(file.path.display().to_string());
            }
        }
    }

    let bots = records.iter().filter(|r| r.is_bot).count();
    let boosters = records.iter().filter(|r| r.boosting_since.is_some()).count();
    let mut embed = CreateEmbed::default()
        .title("👁️ Member collection complete")
        .description(format!("Member list of **{}**", guild.name))
        .color(serenity::Color::from_rgb(0, 191, 255))
        .field("Total members", format!("{}", records.len()), true)
        .field("Humans", format!("{}", records.len() - bots), true)
        .field("Bots", format!("{bots}"), true)
        .field("Boosters", format!("{boosters}"), true)
        .timestamp(serenity::Timestamp::now());
    if !local_paths.is_empty() {
        embed = embed.field(
            "⚠️ Too large to upload, saved locally",
            local_paths.join("\n"),
            false,
        );
    }

    channel_id
        .send_message(&ctx.http, reply.embed(embed))
        .await?;

    Ok(MemberOutcome {
        member_count: records.len(),
        uploaded,
        local_paths,
    })
}
