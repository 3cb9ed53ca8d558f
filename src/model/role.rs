/// Account role carried in the access token as its numeric id.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    System = 4,
    ApiUser = 5,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Hr => "hr",
            Role::Employee => "employee",
            Role::System => "system",
            Role::ApiUser => "api_user",
        }
    }
}

impl TryFrom<u8> for Role {
    type Error = u8;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            1 => Ok(Role::Admin),
            2 => Ok(Role::Hr),
            3 => Ok(Role::Employee),
            4 => Ok(Role::System),
            5 => Ok(Role::ApiUser),
            other => Err(other),
        }
    }
}
