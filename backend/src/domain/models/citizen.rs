/// A civil-registry record as held by the durable store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainCitizen {
    pub id: i64,
    pub birth_date: String,
    pub paternal_surname: String,
    pub maternal_surname: String,
    pub given_name: String,
    /// Base64 PNG of the QR raster. Regenerable from `generated_code`.
    pub qr_image_encoded: String,
    pub generated_code: String,
}

/// A record about to be inserted; the store assigns the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCitizen {
    pub birth_date: String,
    pub paternal_surname: String,
    pub maternal_surname: String,
    pub given_name: String,
    pub qr_image_encoded: String,
    pub generated_code: String,
}

impl NewCitizen {
    pub fn with_id(self, id: i64) -> DomainCitizen {
        DomainCitizen {
            id,
            birth_date: self.birth_date,
            paternal_surname: self.paternal_surname,
            maternal_surname: self.maternal_surname,
            given_name: self.given_name,
            qr_image_encoded: self.qr_image_encoded,
            generated_code: self.generated_code,
        }
    }
}
