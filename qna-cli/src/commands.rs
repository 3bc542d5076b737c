//! Command line surface over [`KnowledgeBaseAdapter`].

use clap::{Args, Parser, Subcommand};
use qna_store::{KnowledgeBaseAdapter, ListOptions, QnaId, QnaItem, StoreResult};
use serde_json::{Value, json};

#[derive(Debug, Parser)]
#[command(
    name = "qna",
    about = "Manage the question/answer pairs of a QnA Maker knowledge base"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Number of stored pairs
    Count,
    /// List stored pairs, optionally one page of them
    List {
        #[arg(long)]
        limit: Option<usize>,
        /// Start of the page; only valid together with --limit
        #[arg(long, requires = "limit")]
        offset: Option<usize>,
    },
    /// Show the raw stored record for an id
    Show { id: QnaId },
    /// Ask the published knowledge base a question
    Ask { question: String },
    /// Add a new pair and publish
    Add(ItemArgs),
    /// Replace the pair stored under an id and publish
    Update {
        id: QnaId,
        #[command(flatten)]
        item: ItemArgs,
    },
    /// Delete pairs by id and publish
    Delete {
        #[arg(required = true)]
        ids: Vec<QnaId>,
    },
    /// Publish staged edits
    Publish,
}

#[derive(Debug, Args)]
pub struct ItemArgs {
    /// Answer text
    #[arg(long)]
    pub answer: String,
    /// Question phrasing; repeat for alternatives
    #[arg(long = "question", required = true)]
    pub questions: Vec<String>,
    /// Store the pair as disabled
    #[arg(long)]
    pub disabled: bool,
    #[arg(long)]
    pub action: Option<String>,
    /// Redirect to this flow (requires --redirect-node)
    #[arg(long, requires = "redirect_node")]
    pub redirect_flow: Option<String>,
    #[arg(long, requires = "redirect_flow")]
    pub redirect_node: Option<String>,
}

impl ItemArgs {
    pub fn into_item(self) -> QnaItem {
        let mut item = QnaItem::new(self.answer, self.questions).with_enabled(!self.disabled);
        if let Some(action) = self.action {
            item = item.with_action(action);
        }
        if let (Some(flow), Some(node)) = (self.redirect_flow, self.redirect_node) {
            item = item.with_redirect(flow, node);
        }
        item
    }
}

impl Command {
    fn list_options(limit: Option<usize>, offset: Option<usize>) -> ListOptions {
        match limit {
            Some(limit) => ListOptions::page(limit, offset.unwrap_or(0)),
            None => ListOptions::default(),
        }
    }
}

/// Execute `command` and return what should be printed.
pub async fn run(adapter: &KnowledgeBaseAdapter, command: Command) -> StoreResult<Value> {
    let output = match command {
        Command::Count => json!({ "count": adapter.count().await? }),
        Command::List { limit, offset } => {
            let entries = adapter.all(Command::list_options(limit, offset)).await?;
            serde_json::to_value(entries)?
        }
        Command::Show { id } => serde_json::to_value(adapter.get_question(id).await?)?,
        Command::Ask { question } => serde_json::to_value(adapter.answers_on(&question).await?)?,
        Command::Add(args) => {
            adapter.insert_one(&args.into_item()).await?;
            json!({ "status": "added" })
        }
        Command::Update { id, item } => {
            let id = adapter.update(&item.into_item(), id).await?;
            json!({ "status": "updated", "id": id })
        }
        Command::Delete { ids } => {
            adapter.delete(&ids).await?;
            json!({ "status": "deleted", "ids": ids })
        }
        Command::Publish => {
            adapter.publish().await?;
            json!({ "status": "published" })
        }
    };
    Ok(output)
}
