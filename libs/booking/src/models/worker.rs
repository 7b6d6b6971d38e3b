//! Worker profile model and approval state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::geo::Coordinates;

/// Bio placed on a fresh application until the applicant writes their own.
pub const APPLICANT_BIO: &str = "신규 지원자입니다.";

/// Public-facing profile of a field worker, keyed by the account id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerProfile {
    pub account_id: Uuid,
    pub display_name: String,
    pub phone: String,
    pub bio: String,
    pub coordinates: Coordinates,
    pub address: String,
    pub experience_years: i32,
    /// Worker-controlled: currently accepting new work
    pub is_available: bool,
    pub photo_url: Option<String>,
    pub max_distance_km: i32,
    pub equipment_count: i32,
    pub portfolio_urls: Vec<String>,
    /// Admin-controlled: listed publicly and entitled to the WORKER role
    pub is_approved: bool,
    pub updated_at: DateTime<Utc>,
}

impl WorkerProfile {
    /// A fresh, unapproved application with placeholder values
    pub fn application(account_id: Uuid, display_name: String, photo_url: Option<String>) -> Self {
        Self {
            account_id,
            display_name,
            phone: String::new(),
            bio: APPLICANT_BIO.to_string(),
            coordinates: Coordinates::WORKER_DEFAULT,
            address: String::new(),
            experience_years: 1,
            is_available: true,
            photo_url,
            max_distance_km: 10,
            equipment_count: 1,
            portfolio_urls: Vec::new(),
            is_approved: false,
            updated_at: Utc::now(),
        }
    }

    /// Merge the supplied fields; never touches `is_approved`
    pub fn merge(&mut self, update: WorkerProfileUpdate) {
        if let Some(display_name) = update.display_name {
            self.display_name = display_name;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(bio) = update.bio {
            self.bio = bio;
        }
        if let Some(coordinates) = update.coordinates {
            self.coordinates = coordinates;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        if let Some(experience_years) = update.experience_years {
            self.experience_years = experience_years;
        }
        if let Some(equipment_count) = update.equipment_count {
            self.equipment_count = equipment_count;
        }
        if let Some(max_distance_km) = update.max_distance_km {
            self.max_distance_km = max_distance_km;
        }
        if let Some(is_available) = update.is_available {
            self.is_available = is_available;
        }
        self.updated_at = Utc::now();
    }

    /// Remove the first portfolio entry equal to `url`; returns whether one was removed
    pub fn remove_portfolio_url(&mut self, url: &str) -> bool {
        match self.portfolio_urls.iter().position(|u| u == url) {
            Some(index) => {
                self.portfolio_urls.remove(index);
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

/// Fields an applicant may change on their own profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerProfileUpdate {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub address: Option<String>,
    pub experience_years: Option<i32>,
    pub equipment_count: Option<i32>,
    pub max_distance_km: Option<i32>,
    pub is_available: Option<bool>,
}

/// Position of an account in the worker application flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalState {
    NotApplied,
    PendingApproval,
    Approved,
}

impl ApprovalState {
    pub fn of(profile: Option<&WorkerProfile>) -> Self {
        match profile {
            None => ApprovalState::NotApplied,
            Some(p) if p.is_approved => ApprovalState::Approved,
            Some(_) => ApprovalState::PendingApproval,
        }
    }
}

/// Entry of the public worker map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicWorker {
    pub account_id: Uuid,
    pub display_name: String,
    pub masked_phone: String,
    pub bio: String,
    pub coordinates: Coordinates,
    pub address: String,
    pub experience_years: i32,
    pub is_available: bool,
    pub photo_url: Option<String>,
    pub max_distance_km: i32,
    pub equipment_count: i32,
    pub portfolio_urls: Vec<String>,
}

impl From<&WorkerProfile> for PublicWorker {
    fn from(profile: &WorkerProfile) -> Self {
        Self {
            account_id: profile.account_id,
            display_name: profile.display_name.clone(),
            masked_phone: mask_phone(&profile.phone),
            bio: profile.bio.clone(),
            coordinates: profile.coordinates,
            address: profile.address.clone(),
            experience_years: profile.experience_years,
            is_available: profile.is_available,
            photo_url: profile.photo_url.clone(),
            max_distance_km: profile.max_distance_km,
            equipment_count: profile.equipment_count,
            portfolio_urls: profile.portfolio_urls.clone(),
        }
    }
}

/// Admin view of worker profiles split by approval
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkerRoster {
    pub pending: Vec<WorkerProfile>,
    pub approved: Vec<WorkerProfile>,
}

/// Hide the last group of a phone number for public display
///
/// `010-1234-5678` becomes `010-1234-****`; an undashed number keeps all but
/// its last four characters. Anything shorter, or dashed into a shape other
/// than three groups, becomes `****`.
pub fn mask_phone(phone: &str) -> String {
    if phone.is_empty() {
        return String::new();
    }

    if phone.contains('-') {
        let parts: Vec<&str> = phone.split('-').collect();
        return match parts.as_slice() {
            [first, second, _] => format!("{}-{}-****", first, second),
            _ => "****".to_string(),
        };
    }

    let chars: Vec<char> = phone.chars().collect();
    if chars.len() > 4 {
        let kept: String = chars[..chars.len() - 4].iter().collect();
        format!("{}****", kept)
    } else {
        "****".to_string()
    }
}
