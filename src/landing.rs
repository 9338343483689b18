pub const HERO_TITLE: &str = "Couchbase";
pub const HERO_TAGLINE: &str = "Empowering Innovation Through Modern Database Solutions";
pub const TEAM_HEADING: &str = "Our Team";

pub struct TeamMember {
    pub name: &'static str,
    pub role: &'static str,
}

impl TeamMember {
    pub fn initials(&self) -> String {
        self.name
            .split(' ')
            .filter_map(|part| part.chars().next())
            .collect()
    }
}

pub const TEAM: [TeamMember; 3] = [
    TeamMember {
        name: "Blaise Lorenz Bernabe",
        role: "Hipster",
    },
    TeamMember {
        name: "Arjay Nino Saguisa",
        role: "Hacker",
    },
    TeamMember {
        name: "John Reddick Quijano",
        role: "Hustler",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_initials() {
        let initials: Vec<String> = TEAM.iter().map(|m| m.initials()).collect();
        assert_eq!(initials, vec!["BLB", "ANS", "JRQ"]);
    }
}
