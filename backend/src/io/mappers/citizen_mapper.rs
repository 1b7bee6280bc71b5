use shared::{CitizenListResponse, CitizenRecord};

use crate::domain::models::DomainCitizen;

/// Mapper from domain citizen records to the shared DTOs.
pub struct CitizenMapper;

impl CitizenMapper {
    pub fn to_dto(domain: DomainCitizen) -> CitizenRecord {
        CitizenRecord {
            id: domain.id,
            birth_date: domain.birth_date,
            paternal_surname: domain.paternal_surname,
            maternal_surname: domain.maternal_surname,
            given_name: domain.given_name,
            code: domain.generated_code,
            qr_png_base64: domain.qr_image_encoded,
        }
    }

    /// Converts domain records to the DTO, preserving the store's order
    pub fn to_citizen_list_dto(domain_citizens: Vec<DomainCitizen>) -> CitizenListResponse {
        CitizenListResponse {
            records: domain_citizens.into_iter().map(Self::to_dto).collect(),
        }
    }
}
