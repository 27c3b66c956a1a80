use serde::{Deserialize, Serialize};

use loanapi_core::{AddressId, DomainError, DomainResult, Entity};

use crate::validation::check_address_request;

/// Brazilian federative unit an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Acre,
    Alagoas,
    Amapa,
    Amazonas,
    Bahia,
    Ceara,
    DistritoFederal,
    EspiritoSanto,
    Goias,
    Maranhao,
    MatoGrosso,
    MatoGrossoDoSul,
    MinasGerais,
    Para,
    Paraiba,
    Parana,
    Pernambuco,
    Piaui,
    RioDeJaneiro,
    RioGrandeDoNorte,
    RioGrandeDoSul,
    Rondonia,
    Roraima,
    SantaCatarina,
    SaoPaulo,
    Sergipe,
    Tocantins,
}

const STATE_NAMES: [(State, &str); 27] = [
    (State::Acre, "ACRE"),
    (State::Alagoas, "ALAGOAS"),
    (State::Amapa, "AMAPA"),
    (State::Amazonas, "AMAZONAS"),
    (State::Bahia, "BAHIA"),
    (State::Ceara, "CEARA"),
    (State::DistritoFederal, "DISTRITO_FEDERAL"),
    (State::EspiritoSanto, "ESPIRITO_SANTO"),
    (State::Goias, "GOIAS"),
    (State::Maranhao, "MARANHAO"),
    (State::MatoGrosso, "MATO_GROSSO"),
    (State::MatoGrossoDoSul, "MATO_GROSSO_DO_SUL"),
    (State::MinasGerais, "MINAS_GERAIS"),
    (State::Para, "PARA"),
    (State::Paraiba, "PARAIBA"),
    (State::Parana, "PARANA"),
    (State::Pernambuco, "PERNAMBUCO"),
    (State::Piaui, "PIAUI"),
    (State::RioDeJaneiro, "RIO_DE_JANEIRO"),
    (State::RioGrandeDoNorte, "RIO_GRANDE_DO_NORTE"),
    (State::RioGrandeDoSul, "RIO_GRANDE_DO_SUL"),
    (State::Rondonia, "RONDONIA"),
    (State::Roraima, "RORAIMA"),
    (State::SantaCatarina, "SANTA_CATARINA"),
    (State::SaoPaulo, "SAO_PAULO"),
    (State::Sergipe, "SERGIPE"),
    (State::Tocantins, "TOCANTINS"),
];

impl State {
    pub fn as_str(&self) -> &'static str {
        STATE_NAMES
            .iter()
            .find(|(state, _)| state == self)
            .map(|(_, name)| *name)
            .unwrap_or_default()
    }
}

impl core::str::FromStr for State {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        STATE_NAMES
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(state, _)| *state)
            .ok_or_else(|| DomainError::validation(format!("unknown state: {s}")))
    }
}

/// Postal address. Several customers may reference the same address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Option<AddressId>,
    pub street: String,
    pub neighborhood: String,
    pub number: i32,
    pub postal_code: String,
    pub city: String,
    pub state: State,
}

impl Address {
    /// Build a validated address from a request, keeping the referenced id.
    pub fn from_request(request: AddressRequest) -> DomainResult<Self> {
        check_address_request(&request)?;
        Ok(Self {
            id: request.id,
            street: request.street.trim().to_string(),
            neighborhood: request.neighborhood.trim().to_string(),
            number: request.number,
            postal_code: request.postal_code.trim().to_string(),
            city: request.city.trim().to_string(),
            state: request.state,
        })
    }
}

impl Entity for Address {
    type Id = AddressId;

    fn id(&self) -> Option<AddressId> {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    /// Reference an already stored address instead of creating a new one.
    #[serde(default)]
    pub id: Option<AddressId>,
    pub street: String,
    pub neighborhood: String,
    pub number: i32,
    pub postal_code: String,
    pub city: String,
    pub state: State,
}
