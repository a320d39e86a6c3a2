//! Continent Lookup Module
//! Static country -> continent table, including the name variants found in the dataset.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Continent a country is rolled up into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Continent {
    Africa,
    Asia,
    Europe,
    #[serde(rename = "North America")]
    NorthAmerica,
    Oceania,
    #[serde(rename = "South America")]
    SouthAmerica,
    /// Entries the table files outside any continent (cruise ships, "Others").
    Others,
    /// Names missing from the table.
    Unmapped,
}

impl Continent {
    pub const ALL: [Continent; 8] = [
        Continent::Africa,
        Continent::Asia,
        Continent::Europe,
        Continent::NorthAmerica,
        Continent::Oceania,
        Continent::SouthAmerica,
        Continent::Others,
        Continent::Unmapped,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::NorthAmerica => "North America",
            Continent::Oceania => "Oceania",
            Continent::SouthAmerica => "South America",
            Continent::Others => "Others",
            Continent::Unmapped => "Unmapped",
        }
    }

    /// Resolve a country name. Unknown names map to [`Continent::Unmapped`].
    pub fn for_country(country: &str) -> Continent {
        lookup_table()
            .get(country.trim())
            .copied()
            .unwrap_or(Continent::Unmapped)
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Continent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Continent::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| format!("unknown continent label: {s}"))
    }
}

fn lookup_table() -> &'static HashMap<&'static str, Continent> {
    static TABLE: OnceLock<HashMap<&'static str, Continent>> = OnceLock::new();
    TABLE.get_or_init(|| COUNTRY_CONTINENTS.iter().copied().collect())
}

/// Country names as they appear in the dataset, spelling variants included.
pub const COUNTRY_CONTINENTS: &[(&str, Continent)] = &[
    ("Afghanistan", Continent::Asia),
    ("Albania", Continent::Europe),
    ("Algeria", Continent::Africa),
    ("Andorra", Continent::Europe),
    ("Angola", Continent::Africa),
    ("Antigua and Barbuda", Continent::NorthAmerica),
    ("Argentina", Continent::SouthAmerica),
    ("Armenia", Continent::Asia),
    ("Aruba", Continent::NorthAmerica),
    ("Australia", Continent::Oceania),
    ("Austria", Continent::Europe),
    ("Azerbaijan", Continent::Asia),
    ("Bahamas", Continent::NorthAmerica),
    ("Bahamas, The", Continent::NorthAmerica),
    ("Bahrain", Continent::Asia),
    ("Bangladesh", Continent::Asia),
    ("Barbados", Continent::NorthAmerica),
    ("Belarus", Continent::Europe),
    ("Belgium", Continent::Europe),
    ("Belize", Continent::NorthAmerica),
    ("Benin", Continent::Africa),
    ("Bhutan", Continent::Asia),
    ("Bolivia", Continent::SouthAmerica),
    ("Bosnia and Herzegovina", Continent::Europe),
    ("Botswana", Continent::Africa),
    ("Brazil", Continent::SouthAmerica),
    ("Brunei", Continent::Asia),
    ("Bulgaria", Continent::Europe),
    ("Burkina Faso", Continent::Africa),
    ("Burma", Continent::Asia),
    ("Burundi", Continent::Africa),
    ("Cabo Verde", Continent::Africa),
    ("Cambodia", Continent::Asia),
    ("Cameroon", Continent::Africa),
    ("Canada", Continent::NorthAmerica),
    ("Cape Verde", Continent::Africa),
    ("Cayman Islands", Continent::NorthAmerica),
    ("Central African Republic", Continent::Africa),
    ("Chad", Continent::Africa),
    ("Channel Islands", Continent::Europe),
    ("Chile", Continent::SouthAmerica),
    ("China", Continent::Asia),
    ("Colombia", Continent::SouthAmerica),
    ("Comoros", Continent::Africa),
    ("Congo (Brazzaville)", Continent::Africa),
    ("Congo (Kinshasa)", Continent::Africa),
    ("Costa Rica", Continent::NorthAmerica),
    ("Croatia", Continent::Europe),
    ("Cuba", Continent::NorthAmerica),
    ("Curacao", Continent::NorthAmerica),
    ("Cyprus", Continent::Europe),
    ("Czech Republic", Continent::Europe),
    ("Denmark", Continent::Europe),
    ("Diamond Princess", Continent::Others),
    ("Djibouti", Continent::Africa),
    ("Dominica", Continent::NorthAmerica),
    ("Dominican Republic", Continent::NorthAmerica),
    ("East Timor", Continent::Asia),
    ("Ecuador", Continent::SouthAmerica),
    ("Egypt", Continent::Africa),
    ("El Salvador", Continent::NorthAmerica),
    ("Equatorial Guinea", Continent::Africa),
    ("Eritrea", Continent::Africa),
    ("Estonia", Continent::Europe),
    ("Eswatini", Continent::Africa),
    ("Ethiopia", Continent::Africa),
    ("Faroe Islands", Continent::Europe),
    ("Fiji", Continent::Oceania),
    ("Finland", Continent::Europe),
    ("France", Continent::Europe),
    ("French Guiana", Continent::SouthAmerica),
    ("Gabon", Continent::Africa),
    ("Gambia", Continent::Africa),
    ("Gambia, The", Continent::Africa),
    ("Georgia", Continent::Asia),
    ("Germany", Continent::Europe),
    ("Ghana", Continent::Africa),
    ("Gibraltar", Continent::Europe),
    ("Greece", Continent::Europe),
    ("Greenland", Continent::NorthAmerica),
    ("Grenada", Continent::NorthAmerica),
    ("Guadeloupe", Continent::NorthAmerica),
    ("Guam", Continent::Oceania),
    ("Guatemala", Continent::NorthAmerica),
    ("Guernsey", Continent::Europe),
    ("Guinea", Continent::Africa),
    ("Guinea-Bissau", Continent::Africa),
    ("Guyana", Continent::SouthAmerica),
    ("Haiti", Continent::NorthAmerica),
    ("Holy See", Continent::Europe),
    ("Honduras", Continent::NorthAmerica),
    ("Hong Kong", Continent::Asia),
    ("Hungary", Continent::Europe),
    ("Iceland", Continent::Europe),
    ("India", Continent::Asia),
    ("Indonesia", Continent::Asia),
    ("Iran", Continent::Asia),
    ("Iraq", Continent::Asia),
    ("Ireland", Continent::Europe),
    ("Israel", Continent::Asia),
    ("Italy", Continent::Europe),
    ("Ivory Coast", Continent::Africa),
    ("Jamaica", Continent::NorthAmerica),
    ("Japan", Continent::Asia),
    ("Jersey", Continent::Europe),
    ("Jordan", Continent::Asia),
    ("Kazakhstan", Continent::Asia),
    ("Kenya", Continent::Africa),
    ("Kiribati", Continent::Oceania),
    ("Kosovo", Continent::Europe),
    ("Kuwait", Continent::Asia),
    ("Kyrgyzstan", Continent::Asia),
    ("Laos", Continent::Asia),
    ("Latvia", Continent::Europe),
    ("Lebanon", Continent::Asia),
    ("Lesotho", Continent::Africa),
    ("Liberia", Continent::Africa),
    ("Libya", Continent::Africa),
    ("Liechtenstein", Continent::Europe),
    ("Lithuania", Continent::Europe),
    ("Luxembourg", Continent::Europe),
    ("MS Zaandam", Continent::Others),
    ("Macau", Continent::Asia),
    ("Madagascar", Continent::Africa),
    ("Mainland China", Continent::Asia),
    ("Malawi", Continent::Africa),
    ("Malaysia", Continent::Asia),
    ("Maldives", Continent::Asia),
    ("Mali", Continent::Africa),
    ("Malta", Continent::Europe),
    ("Marshall Islands", Continent::Oceania),
    ("Martinique", Continent::NorthAmerica),
    ("Mauritania", Continent::Africa),
    ("Mauritius", Continent::Africa),
    ("Mayotte", Continent::Africa),
    ("Mexico", Continent::NorthAmerica),
    ("Micronesia", Continent::Oceania),
    ("Moldova", Continent::Europe),
    ("Monaco", Continent::Europe),
    ("Mongolia", Continent::Asia),
    ("Montenegro", Continent::Europe),
    ("Morocco", Continent::Africa),
    ("Mozambique", Continent::Africa),
    ("Namibia", Continent::Africa),
    ("Nepal", Continent::Asia),
    ("Netherlands", Continent::Europe),
    ("New Zealand", Continent::Oceania),
    ("Nicaragua", Continent::NorthAmerica),
    ("Niger", Continent::Africa),
    ("Nigeria", Continent::Africa),
    ("North Ireland", Continent::Europe),
    ("North Macedonia", Continent::Europe),
    ("Norway", Continent::Europe),
    ("Oman", Continent::Asia),
    ("Others", Continent::Others),
    ("Pakistan", Continent::Asia),
    ("Palestine", Continent::Asia),
    ("Panama", Continent::NorthAmerica),
    ("Papua New Guinea", Continent::Oceania),
    ("Paraguay", Continent::SouthAmerica),
    ("Peru", Continent::SouthAmerica),
    ("Philippines", Continent::Asia),
    ("Poland", Continent::Europe),
    ("Portugal", Continent::Europe),
    ("Puerto Rico", Continent::NorthAmerica),
    ("Qatar", Continent::Asia),
    ("Republic of Ireland", Continent::Europe),
    ("Republic of the Congo", Continent::Africa),
    ("Reunion", Continent::Africa),
    ("Romania", Continent::Europe),
    ("Russia", Continent::Europe),
    ("Rwanda", Continent::Africa),
    ("Saint Barthelemy", Continent::NorthAmerica),
    ("Saint Kitts and Nevis", Continent::NorthAmerica),
    ("Saint Lucia", Continent::NorthAmerica),
    ("Saint Vincent and the Grenadines", Continent::NorthAmerica),
    ("Samoa", Continent::Oceania),
    ("San Marino", Continent::Europe),
    ("Sao Tome and Principe", Continent::Africa),
    ("Saudi Arabia", Continent::Asia),
    ("Senegal", Continent::Africa),
    ("Serbia", Continent::Europe),
    ("Seychelles", Continent::Africa),
    ("Sierra Leone", Continent::Africa),
    ("Singapore", Continent::Asia),
    ("Slovakia", Continent::Europe),
    ("Slovenia", Continent::Europe),
    ("Solomon Islands", Continent::Oceania),
    ("Somalia", Continent::Africa),
    ("South Africa", Continent::Africa),
    ("South Korea", Continent::Asia),
    ("South Sudan", Continent::Africa),
    ("Spain", Continent::Europe),
    ("Sri Lanka", Continent::Asia),
    ("St. Martin", Continent::NorthAmerica),
    ("('St. Martin',)", Continent::NorthAmerica),
    ("Sudan", Continent::Africa),
    ("Suriname", Continent::SouthAmerica),
    ("Sweden", Continent::Europe),
    ("Switzerland", Continent::Europe),
    ("Syria", Continent::Asia),
    ("Taiwan", Continent::Asia),
    ("Tajikistan", Continent::Asia),
    ("Tanzania", Continent::Africa),
    ("Thailand", Continent::Asia),
    ("The Bahamas", Continent::NorthAmerica),
    ("The Gambia", Continent::Africa),
    ("Timor-Leste", Continent::Asia),
    ("Togo", Continent::Africa),
    ("Trinidad and Tobago", Continent::NorthAmerica),
    ("Tunisia", Continent::Africa),
    ("Turkey", Continent::Asia),
    ("UK", Continent::Europe),
    ("US", Continent::NorthAmerica),
    ("Uganda", Continent::Africa),
    ("Ukraine", Continent::Europe),
    ("United Arab Emirates", Continent::Asia),
    ("Uruguay", Continent::SouthAmerica),
    ("Uzbekistan", Continent::Asia),
    ("Vanuatu", Continent::Oceania),
    ("Vatican City", Continent::Europe),
    ("Venezuela", Continent::SouthAmerica),
    ("Vietnam", Continent::Asia),
    ("West Bank and Gaza", Continent::Asia),
    ("occupied Palestinian territory", Continent::Asia),
    ("Yemen", Continent::Asia),
    ("Zambia", Continent::Africa),
    ("Zimbabwe", Continent::Africa),
];
