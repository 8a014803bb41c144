use serde::Serialize;

/// 俱乐部内的角色，数值越大权限越高
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ClubRole {
    Curious,
    ActiveMember,
    BoardMember,
    ItSupervisor,
    Secretary,
    CommunicationSupervisor,
    Treasurer,
    VicePresident,
    President,
}

impl ClubRole {
    pub fn from_id(id: i32) -> Option<Self> {
        let role = match id {
            0 => ClubRole::Curious,
            1 => ClubRole::ActiveMember,
            2 => ClubRole::BoardMember,
            3 => ClubRole::ItSupervisor,
            4 => ClubRole::Secretary,
            5 => ClubRole::CommunicationSupervisor,
            7 => ClubRole::Treasurer,
            9 => ClubRole::VicePresident,
            10 => ClubRole::President,
            _ => return None,
        };
        Some(role)
    }

    pub fn label(self) -> &'static str {
        match self {
            ClubRole::Curious => "Curious",
            ClubRole::ActiveMember => "Active member",
            ClubRole::BoardMember => "Board member",
            ClubRole::ItSupervisor => "IT supervisor",
            ClubRole::Secretary => "Secretary",
            ClubRole::CommunicationSupervisor => "Communication supervisor",
            ClubRole::Treasurer => "Treasurer",
            ClubRole::VicePresident => "Vice-President",
            ClubRole::President => "President",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_are_roles() {
        for id in [0, 1, 2, 3, 4, 5, 7, 9, 10] {
            assert!(ClubRole::from_id(id).is_some(), "role {id}");
        }
        assert_eq!(ClubRole::from_id(7), Some(ClubRole::Treasurer));
        assert_eq!(ClubRole::from_id(10).map(ClubRole::label), Some("President"));
    }

    #[test]
    fn gaps_are_not_roles() {
        assert_eq!(ClubRole::from_id(6), None);
        assert_eq!(ClubRole::from_id(8), None);
        assert_eq!(ClubRole::from_id(-1), None);
    }

    #[test]
    fn ordering_follows_ids() {
        assert!(ClubRole::President > ClubRole::Treasurer);
        assert!(ClubRole::BoardMember > ClubRole::ActiveMember);
    }
}
