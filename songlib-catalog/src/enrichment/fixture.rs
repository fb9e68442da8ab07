//! In-process enrichment provider
//!
//! Serves a small canned catalogue so the service can run without a remote
//! provider. Unknown pairs answer the way the remote provider does: status 400.

use async_trait::async_trait;

use super::{EnrichedSong, EnrichmentClient, EnrichmentError, ProviderDetails};

struct FixtureEntry {
    group: &'static str,
    title: &'static str,
    release_date: &'static str,
    text: &'static str,
    link: &'static str,
}

const CATALOGUE: &[FixtureEntry] = &[
    FixtureEntry {
        group: "Muse",
        title: "Supermassive Black Hole",
        release_date: "16.07.2006",
        text: "Ooh baby, don't you know I suffer?",
        link: "https://www.youtube.com/watch?v=Xsp3_a-PMTw",
    },
    FixtureEntry {
        group: "Enigma",
        title: "Sadeness",
        release_date: "01.10.1990",
        text: "Procedamus in pace\n\
               In nomine Christi, amen\n\
               Cum angelis et pueris\n\
               Fideles inveniamur\n\
               \n\
               Attollite portas, principes, vestras\n\
               Et elevamini, portae aeternales\n\
               Et introibit rex gloriae\n\
               Quis est iste rex gloriae?\n\
               \n\
               Sade, dis-moi\n\
               Sade, donne-moi\n\
               \n\
               Procedamus in pace\n\
               In nomine Christi, amen\n\
               \n\
               Sade, dis-moi\n\
               Qu'est-ce que tu vas chercher?\n\
               Le bien par le mal?\n\
               La vertu par le vice?\n\
               \n\
               Sade, dis-moi\n\
               Pourquoi l'évangile du mal?\n\
               Quelle est ta religion? Où sont tes fidèles?\n\
               Si tu es contre Dieu, tu es contre l'homme\n\
               Sade, es-tu diabolique ou divin?\n\
               \n\
               Sade, dis-moi (Hosanna)\n\
               Sade, donne-moi (Hosanna)\n\
               Sade, dis-moi (Hosanna)\n\
               Sade, donne-moi (Hosanna)\n\
               \n\
               In nomine Christi, amen",
        link: "https://www.youtube.com/watch?v=4F9DxYhqmKw&ab_channel=EnigmaVEVO",
    },
    FixtureEntry {
        group: "Axel F",
        title: "Crazy Frog",
        release_date: "17.05.2005",
        text: "Ring ding ding daa baa\n\
               Baa aramba baa bom baa barooumba\n\
               Wh-wha-what's going on-on?\n\
               Ding, ding\n\
               This is the Crazy Frog\n\
               \n\
               Ding, ding\n\
               Bem bem!\n\
               \n\
               Ring ding ding ding ding ding\n\
               Ring ding ding ding bem bem bem\n\
               Ring ding ding ding ding ding\n\
               Ring ding ding ding baa baa\n\
               Ring ding ding ding ding ding\n\
               Ring ding ding ding bem bem bem\n\
               Ring ding ding ding ding ding\n\
               This is the Crazy Frog\n\
               Breakdown!\n\
               \n\
               Ding ding\n\
               Br-br-break it, br-break it\n\
               Dum dum dumda dum dum dum\n\
               Dum dum dumda dum dum dum\n\
               Dum dum dumda dum dum dum\n\
               Bem, bem!\n\
               Dum dum dumda dum dum dum\n\
               Dum dum dumda dum dum dum\n\
               Dum dum dumda dum dum dum\n\
               This is the Crazy Frog",
        link: "https://www.youtube.com/watch?v=k85mRPqvMbE&ab_channel=CrazyFrog",
    },
];

/// Canned-catalogue provider
#[derive(Debug, Default, Clone)]
pub struct FixtureEnrichmentClient;

impl FixtureEnrichmentClient {
    pub fn new() -> Self {
        Self
    }

    /// Group/title pairs this provider knows
    pub fn known_songs() -> impl Iterator<Item = (&'static str, &'static str)> {
        CATALOGUE.iter().map(|entry| (entry.group, entry.title))
    }
}

#[async_trait]
impl EnrichmentClient for FixtureEnrichmentClient {
    fn provider_name(&self) -> &'static str {
        "fixture"
    }

    async fn lookup(&self, group: &str, title: &str) -> Result<EnrichedSong, EnrichmentError> {
        let entry = CATALOGUE
            .iter()
            .find(|entry| entry.group == group && entry.title == title)
            .ok_or_else(|| EnrichmentError::Status(400, "Song not found".to_string()))?;

        ProviderDetails {
            release_date: entry.release_date.to_string(),
            text: entry.text.to_string(),
            link: entry.link.to_string(),
        }
        .into_enriched()
    }
}
