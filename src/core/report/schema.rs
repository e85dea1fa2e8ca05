//! Report kinds and their fixed column schemas

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Ordered column list of one report
///
/// The column order is the header order and the cell order of every row.
/// `version` is bumped whenever columns are added, removed or reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSchema {
    /// Schema version
    pub version: u32,

    /// Column names, in output order
    pub columns: &'static [&'static str],
}

impl ReportSchema {
    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }
}

/// Shared drive permission columns
pub mod drive_acl {
    pub const DRIVE_NAME: &str = "Shared Drive Name";
    pub const DRIVE_ID: &str = "Shared Drive ID";
    pub const EMAIL: &str = "Permission Email";
    pub const ROLE: &str = "Permission Role";
    pub const TYPE: &str = "Permission Type";
    pub const DISPLAY_NAME: &str = "Permission Display Name";
}

/// User forwarding columns
pub mod forwarding {
    pub const PRIMARY_EMAIL: &str = "Primary Email";
    pub const FULL_NAME: &str = "Full Name";
    pub const FORWARD_TO: &str = "Forwarding Email Address";
    pub const DISPOSITION: &str = "Disposition";
}

/// Group membership columns
pub mod membership {
    pub const GROUP_EMAIL: &str = "Group Email";
    pub const MEMBER_EMAIL: &str = "Member Email";
    pub const ROLE: &str = "Role";
    pub const STATUS: &str = "Status";
}

const SHARED_DRIVE_ACLS: ReportSchema = ReportSchema {
    version: 1,
    columns: &[
        drive_acl::DRIVE_NAME,
        drive_acl::DRIVE_ID,
        drive_acl::EMAIL,
        drive_acl::ROLE,
        drive_acl::TYPE,
        drive_acl::DISPLAY_NAME,
    ],
};

const USER_FORWARDING: ReportSchema = ReportSchema {
    version: 1,
    columns: &[
        forwarding::PRIMARY_EMAIL,
        forwarding::FULL_NAME,
        forwarding::FORWARD_TO,
        forwarding::DISPOSITION,
    ],
};

const GROUP_MEMBERS: ReportSchema = ReportSchema {
    version: 1,
    columns: &[
        membership::GROUP_EMAIL,
        membership::MEMBER_EMAIL,
        membership::ROLE,
        membership::STATUS,
    ],
};

/// Groups Settings fields, in export order
pub const GROUP_SETTINGS_FIELDS: &[&str] = &[
    "email",
    "id",
    "name",
    "description",
    "directMembersCount",
    "adminCreated",
    "aliases",
    "nonEditableAliases",
    "allowExternalMembers",
    "allowWebPosting",
    "archiveOnly",
    "customFooterText",
    "customRolesEnabledForSettingsToBeMerged",
    "defaultMessageDenyNotificationText",
    "defaultSender",
    "enableCollaborativeInbox",
    "includeCustomFooter",
    "includeInGlobalAddressList",
    "isArchived",
    "membersCanPostAsTheGroup",
    "messageModerationLevel",
    "primaryLanguage",
    "replyTo",
    "sendMessageDenyNotification",
    "spamModerationLevel",
    "whoCanContactOwner",
    "whoCanJoin",
    "whoCanLeaveGroup",
    "whoCanPostMessage",
    "whoCanViewGroup",
    "whoCanViewMembership",
    "whoCanDiscoverGroup",
    "showInGroupDirectory",
    "whoCanAssistContent",
    "whoCanAssignTopics",
    "whoCanEnterFreeFormTags",
    "whoCanHideAbuse",
    "whoCanMakeTopicsSticky",
    "whoCanMarkDuplicate",
    "whoCanMarkFavoriteReplyOnAnyTopic",
    "whoCanMarkNoResponseNeeded",
    "whoCanModifyTagsAndCategories",
    "whoCanTakeTopics",
    "whoCanUnassignTopic",
    "whoCanUnmarkFavoriteReplyOnAnyTopic",
    "whoCanModerateContent",
    "whoCanApproveMessages",
    "whoCanDeleteAnyPost",
    "whoCanDeleteTopics",
    "whoCanLockTopics",
    "whoCanMoveTopicsIn",
    "whoCanMoveTopicsOut",
    "whoCanPostAnnouncements",
    "whoCanModerateMembers",
    "whoCanAdd",
    "whoCanApproveMembers",
    "whoCanBanUsers",
    "whoCanInvite",
    "whoCanModifyMembers",
    "allowGoogleCommunication",
    "favoriteRepliesOnTop",
    "maxMessageBytes",
    "messageDisplayFont",
    "whoCanAddReferences",
    "whoCanMarkFavoriteReplyOnOwnTopic",
];

const GROUP_SETTINGS: ReportSchema = ReportSchema {
    version: 1,
    columns: GROUP_SETTINGS_FIELDS,
};

/// The four reports gwarchive can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    /// Permissions of every shared drive
    SharedDriveAcls,
    /// Auto-forwarding of active users
    UserForwarding,
    /// Members of every group
    GroupMembers,
    /// Settings of every group
    GroupSettings,
}

impl ReportKind {
    /// Every report kind
    pub const ALL: [ReportKind; 4] = [
        ReportKind::SharedDriveAcls,
        ReportKind::UserForwarding,
        ReportKind::GroupMembers,
        ReportKind::GroupSettings,
    ];

    /// Command-line name
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::SharedDriveAcls => "shared-drive-acls",
            ReportKind::UserForwarding => "user-forwarding",
            ReportKind::GroupMembers => "group-members",
            ReportKind::GroupSettings => "group-settings",
        }
    }

    /// Column schema
    pub fn schema(&self) -> ReportSchema {
        match self {
            ReportKind::SharedDriveAcls => SHARED_DRIVE_ACLS,
            ReportKind::UserForwarding => USER_FORWARDING,
            ReportKind::GroupMembers => GROUP_MEMBERS,
            ReportKind::GroupSettings => GROUP_SETTINGS,
        }
    }

    /// Prefix of the artifact file name
    pub fn file_prefix(&self) -> &'static str {
        match self {
            ReportKind::SharedDriveAcls => "shared_drive_acls",
            ReportKind::UserForwarding => "active_users_with_forwarding",
            ReportKind::GroupMembers => "gg_backup",
            ReportKind::GroupSettings => "gg_settings_backup",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown report kind '{s}'. Must be one of: {}",
                    ReportKind::ALL.map(|k| k.as_str()).join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_case::test_case;

    #[test_case(ReportKind::SharedDriveAcls, "shared_drive_acls", 6)]
    #[test_case(ReportKind::UserForwarding, "active_users_with_forwarding", 4)]
    #[test_case(ReportKind::GroupMembers, "gg_backup", 4)]
    #[test_case(ReportKind::GroupSettings, "gg_settings_backup", 65)]
    fn test_kind_layout(kind: ReportKind, prefix: &str, width: usize) {
        assert_eq!(kind.file_prefix(), prefix);
        assert_eq!(kind.schema().width(), width);
    }

    #[test]
    fn test_columns_unique() {
        for kind in ReportKind::ALL {
            let columns = kind.schema().columns;
            let unique: HashSet<_> = columns.iter().collect();
            assert_eq!(unique.len(), columns.len(), "{kind} has repeated columns");
        }
    }

    #[test]
    fn test_parse_round_trip() {
        for kind in ReportKind::ALL {
            assert_eq!(kind.as_str().parse::<ReportKind>().unwrap(), kind);
        }
        assert!("groups".parse::<ReportKind>().is_err());
    }

    #[test]
    fn test_value_enum_names_match() {
        for kind in ReportKind::ALL {
            let value = kind.to_possible_value().unwrap();
            assert_eq!(value.get_name(), kind.as_str());
        }
    }

    #[test]
    fn test_settings_start_with_identity() {
        let schema = ReportKind::GroupSettings.schema();
        assert_eq!(schema.columns[0], "email");
        assert_eq!(schema.position("whoCanMarkFavoriteReplyOnOwnTopic"), Some(64));
    }
}
