//! Plan rendering - `QueryPlan` to query text.
//!
//! Pure templating: relationship names, filters and field lists are taken
//! from the plan as they are. Nested nodes select `FROM` their relationship
//! name, top-level nodes (main and side queries) `FROM` their entity name.

pub mod token;

pub use token::{Token, TokenStream};

use crate::config::RenderSettings;
use crate::planner::{QueryOptions, QueryPlan, QueryPlanNode, RowLock, SideQuery, SortDirection};

/// Rendered output: one main query plus one text per side query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedQuery {
    pub main_text: String,
    pub side_texts: Vec<String>,
    /// Label of each side query, parallel to `side_texts`.
    pub side_labels: Vec<String>,
}

impl RenderedQuery {
    /// All queries in one text, separated by blank lines.
    ///
    /// With `label_side_queries`, each side query is preceded by a
    /// `-- Query <label>:` line.
    pub fn combined(&self, label_side_queries: bool) -> String {
        let mut ts = TokenStream::new();
        ts.push(Token::Raw(self.main_text.clone()));

        for (text, label) in self.side_texts.iter().zip(&self.side_labels) {
            ts.push(Token::Newline).push(Token::Newline);
            if label_side_queries {
                ts.push(Token::Comment(format!("Query {}:", label)))
                    .push(Token::Newline);
            }
            ts.push(Token::Raw(text.clone()));
        }

        ts.serialize()
    }
}

/// Serializes query plans.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    settings: RenderSettings,
}

impl Renderer {
    pub fn new(settings: RenderSettings) -> Self {
        Self { settings }
    }

    pub fn render(&self, plan: &QueryPlan) -> RenderedQuery {
        let mut main = self.node_tokens(&plan.main, &plan.main.entity);
        option_tokens(&mut main, &plan.options);

        RenderedQuery {
            main_text: main.serialize(),
            side_texts: plan
                .side_queries
                .iter()
                .map(|side| self.render_side(side))
                .collect(),
            side_labels: plan
                .side_queries
                .iter()
                .map(|side| side.label.clone())
                .collect(),
        }
    }

    /// Render and join into one text, labelled per the settings.
    pub fn render_text(&self, plan: &QueryPlan) -> String {
        self.render(plan).combined(self.settings.label_side_queries)
    }

    fn render_side(&self, side: &SideQuery) -> String {
        self.node_tokens(&side.node, &side.node.entity).serialize()
    }

    fn inlines(&self, node: &QueryPlanNode) -> bool {
        self.settings.inline_parent_lookups && node.is_parent_lookup()
    }

    fn node_tokens(&self, node: &QueryPlanNode, source: &str) -> TokenStream {
        let mut items: Vec<TokenStream> =
            node.fields.iter().map(|f| field_tokens(&[], f)).collect();

        for child in node.children.iter().filter(|c| self.inlines(c)) {
            let mut prefix = Vec::new();
            lookup_items(child, &mut prefix, &mut items);
        }

        for child in node.children.iter().filter(|c| !self.inlines(c)) {
            let source = child.relationship_name.as_deref().unwrap_or(&child.entity);
            let mut sub = TokenStream::new();
            sub.lparen()
                .append(&self.node_tokens(child, source))
                .rparen();
            items.push(sub);
        }

        let mut ts = TokenStream::new();
        ts.push(Token::Select)
            .space()
            .comma_separated(items)
            .space()
            .push(Token::From)
            .space()
            .push(Token::Ident(source.into()));

        if let Some(filter) = &node.filter {
            ts.space()
                .push(Token::Where)
                .space()
                .push(Token::Raw(filter.clone()));
        }

        if let Some(sort) = node.sort.as_ref().filter(|s| !s.fields.is_empty()) {
            let fields = sort.fields.iter().map(|f| field_tokens(&[], f)).collect();
            ts.space().push(Token::OrderBy).space().comma_separated(fields);
            if sort.direction == SortDirection::Desc {
                ts.space().push(Token::Desc);
            }
        }

        if let Some(limit) = node.limit {
            ts.space().push(Token::Limit).space().push(Token::Number(limit));
        }

        ts
    }
}

/// Dotted field references for a parent lookup and its own lookups.
fn lookup_items<'n>(
    node: &'n QueryPlanNode,
    prefix: &mut Vec<&'n str>,
    items: &mut Vec<TokenStream>,
) {
    let name = node.relationship_name.as_deref().unwrap_or(&node.entity);
    prefix.push(name);
    for field in &node.fields {
        items.push(field_tokens(&prefix[..], field));
    }
    for child in &node.children {
        lookup_items(child, prefix, items);
    }
    prefix.pop();
}

fn field_tokens(prefix: &[&str], field: &str) -> TokenStream {
    let mut ts = TokenStream::new();
    for name in prefix {
        ts.push(Token::Ident((*name).into())).push(Token::Dot);
    }
    ts.push(Token::Ident(field.into()));
    ts
}

fn option_tokens(ts: &mut TokenStream, options: &QueryOptions) {
    if options.all_rows {
        ts.space().push(Token::AllRows);
    }
    if let Some(lock) = options.row_lock {
        let token = match lock {
            RowLock::ForView => Token::ForView,
            RowLock::ForReference => Token::ForReference,
            RowLock::ForUpdate => Token::ForUpdate,
        };
        ts.space().push(token);
    }
}
