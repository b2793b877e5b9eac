//! Business logic layer - localization pipeline, session actions and rendering

use crate::consts::{limits, Lang};
use crate::network::{Nutrition, Recipe, RecipeSource};
use crate::session::{HistoryEntry, SessionRegistry};
use crate::translate::Translate;
use crate::utils::{capitalize_first, escape_html, truncate_text};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LocalizeError {
    #[error("recipe has no ingredients")]
    EmptyIngredients,
}

/// A recipe ready for display. `translated` is false when assembly failed and
/// `recipe` is the untranslated original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedRecipe {
    pub recipe: Recipe,
    pub translated: bool,
}

impl LocalizedRecipe {
    #[inline]
    pub fn id(&self) -> Option<i64> {
        self.recipe.id
    }
}

/// Translates title, every ingredient and the instructions (en -> pt), one call
/// at a time. Falls back to the original recipe if assembly fails.
pub async fn localize<T: Translate + ?Sized>(translator: &T, recipe: Recipe) -> LocalizedRecipe {
    match try_localize(translator, &recipe).await {
        Ok(localized) => LocalizedRecipe { recipe: localized, translated: true },
        Err(e) => {
            log::error!("Error translating recipe {:?}: {}", recipe.id, e);
            LocalizedRecipe { recipe, translated: false }
        }
    }
}

async fn try_localize<T: Translate + ?Sized>(translator: &T, recipe: &Recipe) -> Result<Recipe, LocalizeError> {
    if recipe.ingredients.is_empty() {
        return Err(LocalizeError::EmptyIngredients);
    }

    let title = translator.translate(&recipe.title, Lang::En, Lang::Pt).await.text;

    let mut ingredients = Vec::with_capacity(recipe.ingredients.len());
    for ingredient in &recipe.ingredients {
        ingredients.push(translator.translate(ingredient, Lang::En, Lang::Pt).await.text);
    }

    let instructions = translator.translate(&recipe.instructions, Lang::En, Lang::Pt).await.text;

    Ok(Recipe {
        id: recipe.id,
        title,
        ingredients,
        instructions,
        image: recipe.image.clone(),
    })
}

/// Entry point for chat actions. Owns the API clients and every chat's session.
pub struct Chef<T: Translate> {
    source: RecipeSource,
    translator: T,
    sessions: SessionRegistry,
    results_per_query: u32,
}

impl<T: Translate> Chef<T> {
    pub fn new(source: RecipeSource, translator: T, results_per_query: u32) -> Self {
        Self {
            source,
            translator,
            sessions: SessionRegistry::default(),
            results_per_query: results_per_query.max(1),
        }
    }

    /// Portuguese query in, localized recipes out (also recorded in history).
    /// `None` means nothing was found.
    pub async fn find_recipes(&self, chat: i64, query: &str, diet: Option<&str>) -> Option<Vec<LocalizedRecipe>> {
        let translation = self.translator.translate(query, Lang::Pt, Lang::En).await;
        if !translation.translated {
            log::warn!("Query '{}' sent untranslated", query);
        }
        log::info!("Original: '{}' | Traduzido: '{}'", query, translation.text);

        let recipes = self.source.search(&translation.text, self.results_per_query, diet).await?;

        let mut localized = Vec::with_capacity(recipes.len());
        for recipe in recipes {
            localized.push(localize(&self.translator, recipe).await);
        }

        self.sessions.with(chat, |session| {
            for recipe in &localized {
                session.history.append(recipe.clone());
            }
            log::debug!("Chat {} history: {} entries", chat, session.history.len());
        });
        Some(localized)
    }

    pub async fn random_recipe(&self, chat: i64) -> Option<LocalizedRecipe> {
        let recipe = self.source.get_random().await?;
        let localized = localize(&self.translator, recipe).await;
        self.sessions.with(chat, |session| session.history.append(localized.clone()));
        Some(localized)
    }

    /// Queues recipe `id` for display, fetching it if this chat never saw it.
    /// Read the selection with [`take_selected`](Self::take_selected).
    pub async fn select(&self, chat: i64, id: i64) -> bool {
        let known = self
            .sessions
            .with_existing(chat, |session| session.select(id))
            .unwrap_or(false);
        if known {
            return true;
        }

        let Some(recipe) = self.source.get_by_id(id).await else { return false };
        let localized = localize(&self.translator, recipe).await;
        self.sessions.with(chat, |session| {
            session.history.append(localized.clone());
            session.set_pending(localized);
        });
        true
    }

    /// One-shot: the queued selection is cleared by this read.
    pub fn take_selected(&self, chat: i64) -> Option<LocalizedRecipe> {
        self.sessions.with_existing(chat, |session| session.take_pending()).flatten()
    }

    pub async fn nutrition(&self, id: i64) -> Option<Nutrition> {
        self.source.get_nutrition(id).await
    }

    /// Deduplicated, most recent first.
    pub fn history(&self, chat: i64) -> Vec<HistoryEntry> {
        self.sessions
            .with_existing(chat, |session| session.history.unique_latest_first().into_iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn end_session(&self, chat: i64) {
        self.sessions.end(chat);
    }
}

// ═══════════════════════════════════════════════════════════════════
// TELEGRAM HTML FORMATTING
// ═══════════════════════════════════════════════════════════════════

pub fn format_recipe(localized: &LocalizedRecipe) -> String {
    let recipe = &localized.recipe;
    let mut output = format!("<b>🍽️ {}</b>\n", escape_html(&recipe.title));
    if !localized.translated {
        output.push_str("<i>(tradução indisponível)</i>\n");
    }

    if let Some(image) = &recipe.image {
        output.push_str(&format!("<a href=\"{}\">📷 Foto</a>\n", escape_html(image)));
    }

    output.push_str("\n<b>📝 Ingredientes:</b>\n");
    for ingredient in &recipe.ingredients {
        output.push_str(&format!("- {}\n", escape_html(&capitalize_first(ingredient))));
    }

    output.push_str("\n<b>🧑‍🍳 Modo de Preparo:</b>\n");
    output.push_str(&escape_html(&recipe.instructions));
    output.push('\n');

    if let Some(id) = recipe.id {
        output.push_str(&format!("\n<code>/nutrition {}</code>\n", id));
    }
    output
}

pub fn format_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "📜 Histórico vazio.".to_string();
    }
    let mut output = String::from("<b>📜 Histórico</b>\n");
    for entry in entries {
        let Some(id) = entry.recipe.id() else { continue };
        output.push_str(&format!(
            "\n▪️ {} <code>/show {}</code> <i>{}</i>",
            escape_html(&truncate_text(&entry.recipe.recipe.title, limits::HISTORY_TITLE_LEN)),
            id,
            entry.viewed_at.format("%H:%M"),
        ));
    }
    output
}

pub fn format_nutrition(id: i64, n: &Nutrition) -> String {
    format!(
        "<b>🥗 Nutrição (receita {})</b>\n\nCalorias: {}\nGordura: {}\nCarboidratos: {}\nProteína: {}",
        id,
        escape_html(&n.calories),
        escape_html(&n.fat),
        escape_html(&n.carbs),
        escape_html(&n.protein),
    )
}

pub fn build_not_found_message() -> &'static str {
    "Não encontrei receitas com esses termos.\nTente algo como:\n- 'frango assado'\n- 'macarrão integral'\n- 'sobremesa fácil'"
}

/// Build help message
pub fn build_help_message() -> &'static str {
    r#"👩‍🍳 *Chef Virtual de Receitas*

Olá! Eu sou seu chef virtual. 🍴
Diga o que você está com vontade de comer e eu vou encontrar receitas deliciosas para você!
Ex: frango, massa vegana, bolo de chocolate

*Comandos:*
/random — 🍀 Receita aleatória
/history — 📜 Histórico
/show `<id>` — Mostrar receita
/nutrition `<id>` — Informação nutricional
/diet `<dieta> <pedido>` — Busca com dieta (ex: `/diet vegan massa`)
/reset — Limpar histórico"#
}
