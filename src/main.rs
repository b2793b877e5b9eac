//! Chef Virtual - Telegram recipe assistant (Portuguese in, Spoonacular behind)

mod config;
mod consts;
mod logic;
mod network;
mod session;
mod translate;
mod utils;

use crate::config::Config;
use crate::consts::limits;
use crate::logic::{
    build_help_message, build_not_found_message, format_history, format_nutrition, format_recipe, Chef,
};
use crate::network::RecipeSource;
use crate::translate::GoogleTranslator;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;

type AppChef = Chef<GoogleTranslator>;

#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Comandos disponíveis:")]
enum Command {
    #[command(description = "Mostrar ajuda")]
    Start,
    #[command(description = "Mostrar ajuda")]
    Help,
    #[command(description = "🍀 Receita aleatória")]
    Random,
    #[command(description = "📜 Histórico")]
    History,
    #[command(description = "Mostrar receita pelo id")]
    Show(i64),
    #[command(description = "Informação nutricional")]
    Nutrition(i64),
    #[command(description = "Busca com dieta: /diet <dieta> <pedido>")]
    Diet(String),
    #[command(description = "Limpar histórico")]
    Reset,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let client = match RecipeSource::build_client(config.request_timeout) {
        Ok(client) => client,
        Err(e) => {
            log::error!("HTTP client error: {}", e);
            std::process::exit(1);
        }
    };

    let source = RecipeSource::new(
        client.clone(),
        &config.spoonacular_url,
        &config.spoonacular_key,
        &config.api_language,
    );
    let translator = GoogleTranslator::new(client, &config.translate_url);
    let chef: Arc<AppChef> = Arc::new(Chef::new(source, translator, config.results_per_query));

    log::info!("👩‍🍳 Chef Virtual online ({} results per query)", config.results_per_query);

    let bot = Bot::new(&config.telegram_token);
    let handler = Update::filter_message()
        .branch(dptree::entry().filter_command::<Command>().endpoint(handle_command))
        .branch(dptree::endpoint(handle_text));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![chef])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn handle_command(bot: Bot, msg: Message, cmd: Command, chef: Arc<AppChef>) -> ResponseResult<()> {
    let chat_id = msg.chat.id;

    match cmd {
        Command::Start | Command::Help => {
            bot.send_message(chat_id, build_help_message())
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
        Command::Random => {
            let loading = bot.send_message(chat_id, "⏳ Procurando uma receita surpresa...").await?;
            let recipe = chef.random_recipe(chat_id.0).await;
            let _ = bot.delete_message(chat_id, loading.id).await;
            match recipe {
                Some(recipe) => send_html(&bot, chat_id, &format_recipe(&recipe)).await?,
                None => {
                    bot.send_message(chat_id, "Erro ao obter receita aleatória").await?;
                }
            }
        }
        Command::History => {
            bot.send_message(chat_id, format_history(&chef.history(chat_id.0)))
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::Show(id) => {
            if !chef.select(chat_id.0, id).await {
                bot.send_message(chat_id, format!("Receita {} não encontrada.", id)).await?;
                return Ok(());
            }
            if let Some(recipe) = chef.take_selected(chat_id.0) {
                send_html(&bot, chat_id, &format_recipe(&recipe)).await?;
            }
        }
        Command::Nutrition(id) => {
            let text = match chef.nutrition(id).await {
                Some(n) => format_nutrition(id, &n),
                None => format!("Informação nutricional indisponível para {}.", id),
            };
            bot.send_message(chat_id, text).parse_mode(ParseMode::Html).await?;
        }
        Command::Diet(args) => match args.trim().split_once(' ') {
            Some((diet, query)) if !query.trim().is_empty() => {
                search_and_reply(&bot, chat_id, &chef, query.trim(), Some(diet)).await?;
            }
            _ => {
                bot.send_message(chat_id, "Uso: /diet <dieta> <pedido> (ex: /diet vegan massa)").await?;
            }
        },
        Command::Reset => {
            chef.end_session(chat_id.0);
            bot.send_message(chat_id, "🧹 Histórico apagado.").await?;
        }
    }

    Ok(())
}

async fn handle_text(bot: Bot, msg: Message, chef: Arc<AppChef>) -> ResponseResult<()> {
    let Some(text) = msg.text() else { return Ok(()) };
    let query = text.trim();
    if query.is_empty() {
        return Ok(());
    }

    // unknown or malformed command
    if query.starts_with('/') {
        bot.send_message(msg.chat.id, build_help_message())
            .parse_mode(ParseMode::Markdown)
            .await?;
        return Ok(());
    }

    search_and_reply(&bot, msg.chat.id, &chef, query, None).await
}

async fn search_and_reply(
    bot: &Bot,
    chat_id: ChatId,
    chef: &AppChef,
    query: &str,
    diet: Option<&str>,
) -> ResponseResult<()> {
    let loading = bot.send_message(chat_id, "⏳ Procurando receitas...").await?;
    let found = chef.find_recipes(chat_id.0, query, diet).await;
    let _ = bot.delete_message(chat_id, loading.id).await;

    match found {
        Some(recipes) => {
            for recipe in &recipes {
                send_html(bot, chat_id, &format_recipe(recipe)).await?;
            }
            bot.send_message(chat_id, "🍴 Pronto! Aqui estão algumas opções para você!").await?;
        }
        None => {
            bot.send_message(chat_id, build_not_found_message()).await?;
        }
    }
    Ok(())
}

async fn send_html(bot: &Bot, chat_id: ChatId, text: &str) -> ResponseResult<()> {
    for chunk in split_message(text, limits::MAX_MESSAGE_LEN) {
        bot.send_message(chat_id, chunk)
            .parse_mode(ParseMode::Html)
            .await?;
    }
    Ok(())
}

fn split_message(text: &str, max_len: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = start + max_len;
        if end >= text.len() {
            chunks.push(&text[start..]);
            break;
        }
        while !text.is_char_boundary(end) { end -= 1; }
        end = match text[start..end].rfind('\n') {
            Some(last_newline) => start + last_newline + 1,
            None => html_safe_end(text, start, end),
        };
        chunks.push(&text[start..end]);
        start = end;
    }
    chunks
}

/// Pulls `end` back so the chunk does not stop inside an `&...;` entity or a `<...>` tag.
fn html_safe_end(text: &str, start: usize, end: usize) -> usize {
    let mut cut = end;
    let window = &text[start..cut];
    if let Some(amp) = window.rfind('&') {
        if !window[amp..].contains(';') { cut = start + amp; }
    }
    let window = &text[start..cut];
    if let Some(lt) = window.rfind('<') {
        if !window[lt..].contains('>') { cut = start + lt; }
    }
    if cut > start { cut } else { end }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::LocalizedRecipe;
    use crate::network::Recipe;

    #[test]
    fn short_message_is_one_chunk() {
        assert_eq!(split_message("olá", 4000), vec!["olá"]);
    }

    #[test]
    fn split_prefers_newlines() {
        let text = "aaaa\nbbbb\ncccc";
        assert_eq!(split_message(text, 7), vec!["aaaa\n", "bbbb\n", "cccc"]);
    }

    #[test]
    fn split_respects_char_boundaries() {
        let text = "ééééé";
        for chunk in split_message(text, 3) {
            assert!(chunk.chars().all(|c| c == 'é'));
        }
    }

    #[test]
    fn split_never_cuts_an_entity() {
        let text = format!("{}&amp;{}", "a".repeat(3998), "b".repeat(10));
        let chunks = split_message(&text, 4000);
        assert_eq!(chunks, vec!["a".repeat(3998).as_str(), "&amp;bbbbbbbbbb"]);
    }

    #[test]
    fn split_never_cuts_a_tag() {
        let text = format!("{}<code>x</code>", "a".repeat(3997));
        let chunks = split_message(&text, 4000);
        assert_eq!(chunks[0].len(), 3997);
        assert!(chunks[1].starts_with("<code>"));
    }

    #[test]
    fn long_paragraph_recipe_splits_on_whole_entities() {
        let recipe = LocalizedRecipe {
            recipe: Recipe {
                id: Some(1),
                title: "Bolo".into(),
                ingredients: vec!["ovo".into()],
                instructions: "a".repeat(3998) + "&",
                image: None,
            },
            translated: true,
        };
        let html = format_recipe(&recipe);
        let chunks = split_message(&html, limits::MAX_MESSAGE_LEN);

        assert_eq!(chunks.concat(), html);
        for chunk in &chunks {
            assert!(chunk.len() <= limits::MAX_MESSAGE_LEN);
            for (i, _) in chunk.match_indices('&') {
                assert!(chunk[i..].starts_with("&amp;"), "entity split in {:?}", &chunk[i..]);
            }
        }
    }

    #[test]
    fn command_parsing() {
        assert!(matches!(Command::parse("/show 42", "chef_bot"), Ok(Command::Show(42))));
        assert!(matches!(Command::parse("/diet vegan massa", "chef_bot"), Ok(Command::Diet(ref a)) if a == "vegan massa"));
        assert!(Command::parse("/show abc", "chef_bot").is_err());
    }
}
