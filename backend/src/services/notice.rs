//! Localized, user-facing notices.
//!
//! Error notices dismiss themselves after the configured delay; success
//! notices stay until the page closes them.

use std::time::Duration;

use serde::Serialize;

use crate::config::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    CatalogLoadFailed,
    SelectTable,
    NothingSelected,
    SubmissionInFlight,
    OrderFailed,
    OrderPlaced,
    SessionExpired,
    ItemUnavailable,
    BadRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dismiss_after_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Notices {
    locale: Locale,
    dismiss_after: Duration,
}

impl Notices {
    pub fn new(locale: Locale, dismiss_after: Duration) -> Self {
        Self {
            locale,
            dismiss_after,
        }
    }

    pub fn error(&self, key: MessageKey) -> Notice {
        Notice {
            kind: NoticeKind::Error,
            message: self.message(key).to_string(),
            dismiss_after_secs: Some(self.dismiss_after.as_secs()),
        }
    }

    pub fn success(&self, key: MessageKey) -> Notice {
        Notice {
            kind: NoticeKind::Success,
            message: self.message(key).to_string(),
            dismiss_after_secs: None,
        }
    }

    pub fn message(&self, key: MessageKey) -> &'static str {
        match self.locale {
            Locale::Bn => bengali(key),
            Locale::En => english(key),
        }
    }
}

fn bengali(key: MessageKey) -> &'static str {
    match key {
        MessageKey::CatalogLoadFailed => "পণ্য লোড করতে সমস্যা হয়েছে। পরে আবার চেষ্টা করুন।",
        MessageKey::SelectTable => "দয়া করে টেবিল নম্বর নির্বাচন করুন।",
        MessageKey::NothingSelected => "কোনো পণ্য নির্বাচন করা হয়নি।",
        MessageKey::SubmissionInFlight => "আপনার অর্ডার পাঠানো হচ্ছে, একটু অপেক্ষা করুন।",
        MessageKey::OrderFailed => "অর্ডার দিতে সমস্যা হয়েছে। পরে আবার চেষ্টা করুন।",
        MessageKey::OrderPlaced => "আপনার অর্ডার সফলভাবে গ্রহণ করা হয়েছে!",
        MessageKey::SessionExpired => "সেশনের মেয়াদ শেষ হয়েছে। পৃষ্ঠাটি আবার লোড করুন।",
        MessageKey::ItemUnavailable => "এই পণ্যটি এখন পাওয়া যাচ্ছে না।",
        MessageKey::BadRequest => "অনুরোধটি সঠিক নয়।",
    }
}

fn english(key: MessageKey) -> &'static str {
    match key {
        MessageKey::CatalogLoadFailed => "Could not load the menu. Please try again later.",
        MessageKey::SelectTable => "Please select your table number.",
        MessageKey::NothingSelected => "No items selected.",
        MessageKey::SubmissionInFlight => "Your order is being sent, please wait.",
        MessageKey::OrderFailed => "Could not place the order. Please try again later.",
        MessageKey::OrderPlaced => "Your order has been placed!",
        MessageKey::SessionExpired => "Your session has expired. Please reload the page.",
        MessageKey::ItemUnavailable => "This item is no longer available.",
        MessageKey::BadRequest => "The request was not understood.",
    }
}
