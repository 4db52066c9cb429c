//! Unit tests for data models

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use crate::models::*;

    fn sample_record() -> MessageRecord {
        MessageRecord {
            id: 7,
            date: NaiveDate::from_ymd_opt(2026, 1, 15)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            text: "hello".to_string(),
            views: 100,
            forwards: 5,
            reactions: 3,
            reaction_details: Some(BTreeMap::from([
                ("❤️".to_string(), 2),
                ("🔥".to_string(), 1),
            ])),
            total_reactions: 3,
            link: "https://t.me/test/7".to_string(),
            has_photo: false,
            image_path: None,
        }
    }

    #[test]
    fn test_record_date_uses_report_format() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["date"], "2026-01-15 12:00:00");
    }

    #[test]
    fn test_legacy_record_without_details_parses() {
        let json = r#"{
            "id": 1,
            "date": "2025-03-01 08:30:00",
            "text": "old",
            "views": 10,
            "forwards": 0,
            "reactions": 42,
            "total_reactions": 50,
            "link": "https://t.me/test/1"
        }"#;
        let record: MessageRecord = serde_json::from_str(json).unwrap();
        assert!(!record.is_recomputable());
        assert_eq!(record.reactions, 42);
        assert!(!record.has_photo);
        assert!(record.image_path.is_none());
    }

    #[test]
    fn test_legacy_record_serializes_without_details_key() {
        let mut record = sample_record();
        record.reaction_details = None;
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("reaction_details").is_none());
    }

    #[test]
    fn test_target_total() {
        let record = sample_record();
        let targets = vec!["❤️".to_string(), "👍".to_string()];
        assert_eq!(record.target_total(&targets), Some(2));

        let mut legacy = record;
        legacy.reaction_details = None;
        assert_eq!(legacy.target_total(&targets), None);
    }

    #[test]
    fn test_sort_mode_parsing() {
        assert_eq!("1".parse::<SortMode>().unwrap(), SortMode::Reactions);
        assert_eq!(" 2 ".parse::<SortMode>().unwrap(), SortMode::Hotness);
        assert_eq!("Hotness".parse::<SortMode>().unwrap(), SortMode::Hotness);
        assert!("3".parse::<SortMode>().is_err());
        assert_eq!(SortMode::default(), SortMode::Reactions);
    }

    #[test]
    fn test_channel_handle() {
        let public = ChannelInfo {
            id: 1,
            title: "Public".to_string(),
            username: Some("public_ch".to_string()),
        };
        let private = ChannelInfo {
            id: 99,
            title: "Private".to_string(),
            username: None,
        };
        assert_eq!(public.handle(), "@public_ch");
        assert_eq!(private.handle(), "ID: 99");
    }
}
