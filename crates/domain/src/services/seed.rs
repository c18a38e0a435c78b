//! Demo fleet and announcements loaded when `seed_demo_data` is enabled.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::models::{
    Announcement, AnnouncementPriority, AnnouncementStatus, Client, ClientStatus, Group,
};
use crate::services::announcement_board::AnnouncementBoard;
use crate::services::directory::DirectoryStore;

const DEMO_GROUPS: [(&str, &str); 3] = [
    ("1", "MIDTERM 2025"),
    ("2", "LB44X Monitors"),
    ("3", "LB46X Monitors"),
];

/// (id, name, status, minutes since last seen, group)
const DEMO_CLIENTS: [(&str, &str, ClientStatus, i64, Option<&str>); 18] = [
    ("1", "LB467-1", ClientStatus::Connected, 0, Some("1")),
    ("2", "LB467-2", ClientStatus::Connected, 0, Some("1")),
    ("3", "LB467-3", ClientStatus::Error, 10, Some("1")),
    ("4", "LB467-4", ClientStatus::Connected, 0, Some("1")),
    ("5", "LB467-5", ClientStatus::Warning, 0, Some("1")),
    ("6", "LB467-6", ClientStatus::Connected, 0, Some("2")),
    ("7", "LB467-7", ClientStatus::Connected, 0, Some("2")),
    ("8", "LB467-8", ClientStatus::Warning, 5, Some("2")),
    ("9", "LB467-9", ClientStatus::Connected, 0, Some("2")),
    ("10", "LB467-10", ClientStatus::Connected, 0, Some("2")),
    ("11", "LB467-11", ClientStatus::Connected, 0, Some("3")),
    ("12", "LB467-12", ClientStatus::Connected, 0, Some("3")),
    ("13", "ComputerLab01", ClientStatus::Inactive, 1440, Some("3")),
    ("14", "LB467-14", ClientStatus::Connected, 0, Some("3")),
    ("15", "LB467-15", ClientStatus::Connected, 0, Some("3")),
    ("16", "12345678901", ClientStatus::Connected, 0, None),
    ("17", "ABCDEF", ClientStatus::Warning, 60, None),
    ("18", "GHIJKL", ClientStatus::Error, 120, None),
];

pub fn demo_clients(now: DateTime<Utc>) -> Vec<Client> {
    DEMO_CLIENTS
        .iter()
        .map(|&(id, name, status, minutes_ago, group_id)| Client {
            id: id.to_string(),
            name: name.to_string(),
            status,
            last_seen: now - Duration::minutes(minutes_ago),
            group_id: group_id.map(str::to_string),
            selected: false,
            network_address: None,
            location: None,
            contact_person: None,
        })
        .collect()
}

pub fn demo_groups() -> Vec<Group> {
    DEMO_GROUPS
        .iter()
        .map(|&(id, name)| Group {
            id: id.to_string(),
            name: name.to_string(),
            clients: Vec::new(),
            selected: false,
        })
        .collect()
}

/// Builds a directory holding the demo fleet.
pub fn demo_directory(now: DateTime<Utc>, event_buffer: usize) -> DirectoryStore {
    DirectoryStore::from_parts(demo_clients(now), demo_groups(), event_buffer)
}

pub fn demo_announcements(now: DateTime<Utc>) -> Vec<Announcement> {
    let at = |y, m, d, h, min| {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0)
            .earliest()
            .unwrap_or(now)
    };

    let announcement = |id: &str,
                        title: &str,
                        content: &str,
                        created_at: DateTime<Utc>,
                        status: AnnouncementStatus| Announcement {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        status,
        priority: None,
        publish_date: Some(created_at),
        expiration_date: None,
        target_audience: Vec::new(),
        created_at,
        updated_at: created_at,
        last_sent_at: None,
        send_count: 0,
    };

    let mut maintenance = announcement(
        "1",
        "System Maintenance",
        "There will be a scheduled maintenance on all systems this weekend.",
        at(2023, 6, 10, 10, 0),
        AnnouncementStatus::Scheduled,
    );
    // Keep the demo's scheduled item in the future so the sweep leaves it alone.
    maintenance.publish_date = Some(now + Duration::days(3));

    let mut security = announcement(
        "3",
        "Important Security Update",
        "Please ensure all clients are updated to the latest security patch.",
        at(2023, 5, 15, 8, 45),
        AnnouncementStatus::Active,
    );
    security.priority = Some(AnnouncementPriority::High);

    vec![
        maintenance,
        announcement(
            "2",
            "New Feature Release",
            "We are excited to announce the release of our new dashboard features!",
            at(2023, 5, 20, 14, 30),
            AnnouncementStatus::Active,
        ),
        security,
        announcement(
            "4",
            "Holiday Schedule",
            "Our offices will be closed during the upcoming holiday. Support will be limited.",
            at(2023, 4, 30, 16, 20),
            AnnouncementStatus::Completed,
        ),
        announcement(
            "5",
            "Network Upgrades",
            "We will be upgrading our network infrastructure to improve performance.",
            at(2023, 4, 25, 11, 30),
            AnnouncementStatus::Draft,
        ),
    ]
}

/// Builds a board holding the demo announcements.
pub fn demo_board(now: DateTime<Utc>) -> AnnouncementBoard {
    let mut board = AnnouncementBoard::new();
    board.insert_seeded(demo_announcements(now));
    board
}
