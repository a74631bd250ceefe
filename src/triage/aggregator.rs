//! On-demand per-customer conversation summaries.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{ConversationSummary, Message};

/// Sort order for aggregated summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Hottest conversations first.
    #[default]
    MaxUrgency,
    /// Most recently active conversations first.
    LastSeq,
}

/// Group a message snapshot per customer and summarize each conversation.
///
/// `text_filter` keeps only messages containing the filter as a
/// case-insensitive substring before grouping. Recency within a group is the
/// creation sequence `seq`, never wall-clock time; on equal `seq` the later
/// entry in the snapshot wins. Results are sorted descending by the chosen
/// key with `customer_id` as tiebreaker so output is reproducible, then
/// truncated to `limit`. A `limit <= 0` yields no results rather than an
/// error.
pub fn aggregate(
    messages: &[Message],
    text_filter: Option<&str>,
    sort: SortKey,
    limit: i64,
) -> Vec<ConversationSummary> {
    if limit <= 0 {
        return Vec::new();
    }

    let filter = text_filter.map(str::to_lowercase);
    let mut groups: HashMap<Uuid, ConversationSummary> = HashMap::new();

    for msg in messages {
        if let Some(ref f) = filter {
            if !msg.text.to_lowercase().contains(f.as_str()) {
                continue;
            }
        }

        let entry = groups
            .entry(msg.customer_id)
            .or_insert_with(|| ConversationSummary {
                customer_id: msg.customer_id,
                last_message_text: msg.text.clone(),
                last_seq: msg.seq,
                max_urgency: 0,
                topics: BTreeSet::new(),
            });

        if msg.seq >= entry.last_seq {
            entry.last_seq = msg.seq;
            entry.last_message_text = msg.text.clone();
        }
        entry.max_urgency = entry.max_urgency.max(msg.urgency_score);
        if let Some(topic) = msg.topic {
            entry.topics.insert(topic);
        }
    }

    let mut summaries: Vec<ConversationSummary> = groups.into_values().collect();
    match sort {
        SortKey::MaxUrgency => summaries.sort_by(|a, b| {
            b.max_urgency
                .cmp(&a.max_urgency)
                .then_with(|| a.customer_id.cmp(&b.customer_id))
        }),
        SortKey::LastSeq => summaries.sort_by(|a, b| {
            b.last_seq
                .cmp(&a.last_seq)
                .then_with(|| a.customer_id.cmp(&b.customer_id))
        }),
    }

    summaries.truncate(limit as usize);
    summaries
}
