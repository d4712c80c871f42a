use super::{
    IonEvidence,
    ProteinEvidence,
    PsmEvidence,
};
use crate::models::IonFormKey;
use std::collections::HashSet;
use tracing::debug;

/// Copies the protein level uniqueness and razor decisions back onto the PSM
/// and ion collections, and onto the ion copies held by each protein.
///
/// Flags are only ever raised. A PSM that mapped to a single protein keeps its
/// unique flag even when no protein lists its ion as unique.
pub fn propagate_status(
    psms: &mut [PsmEvidence],
    ions: &mut [IonEvidence],
    proteins: &mut [ProteinEvidence],
) {
    let mut unique: HashSet<IonFormKey> = HashSet::new();
    let mut urazor: HashSet<IonFormKey> = HashSet::new();
    for prot in proteins.iter() {
        unique.extend(prot.unique_ions.keys().cloned());
        urazor.extend(prot.urazor_ions.keys().cloned());
    }
    debug!(
        "Propagating status of {} unique and {} razor ions",
        unique.len(),
        urazor.len()
    );

    for psm in psms.iter_mut() {
        psm.is_unique |= unique.contains(&psm.ion_form);
        psm.is_razor |= urazor.contains(&psm.ion_form);
    }

    let refresh = |ion: &mut IonEvidence| {
        ion.is_unique |= unique.contains(&ion.key);
        ion.is_razor |= urazor.contains(&ion.key);
    };
    ions.iter_mut().for_each(refresh);
    for prot in proteins.iter_mut() {
        prot.total_ions.values_mut().for_each(refresh);
        prot.unique_ions.values_mut().for_each(refresh);
        prot.urazor_ions.values_mut().for_each(refresh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{
        ProteinDatabase,
        ProteinDbRecord,
    };
    use crate::evidence::test_utils::{
        listed_ion,
        protein,
        psm,
    };
    use crate::evidence::{
        aggregate_ions,
        assemble_proteins,
    };
    use crate::models::DecoyTag;

    #[test]
    fn test_flags_follow_protein_sets() {
        let mut shared_aaa = psm("s1", "AAA", 2, 500.1234);
        shared_aaa.alternative_proteins = vec!["sp|P2|B_HUMAN".to_string()];
        shared_aaa.is_unique = false;
        let mut shared_bbb = psm("s2", "BBB", 2, 300.0);
        shared_bbb.alternative_proteins = vec!["sp|P2|B_HUMAN".to_string()];
        shared_bbb.is_unique = false;
        let mut psms = vec![shared_aaa, shared_bbb, psm("s3", "CCC", 2, 200.0)];
        let mut ions = aggregate_ions(&psms);
        let db = ProteinDatabase::new(vec![ProteinDbRecord {
            part_header: "sp|P1|A_HUMAN".to_string(),
            ..Default::default()
        }]);
        let p1 = protein(
            "sp|P1|A_HUMAN",
            1,
            vec![
                listed_ion("AAA", 2, 500.1234, true, false),
                listed_ion("BBB", 2, 300.0, false, true),
            ],
        );
        let mut proteins =
            assemble_proteins(&[p1], &ions, &db, &DecoyTag::default(), false, false).unwrap();

        propagate_status(&mut psms, &mut ions, &mut proteins);

        let flags: Vec<_> = psms.iter().map(|x| (x.is_unique, x.is_razor)).collect();
        assert_eq!(flags, vec![(true, true), (false, true), (true, false)]);
        let flags: Vec<_> = ions.iter().map(|x| (x.is_unique, x.is_razor)).collect();
        assert_eq!(flags, vec![(true, true), (false, true), (true, false)]);

        let bbb = proteins[0].urazor_ions.values().find(|x| x.sequence == "BBB").unwrap();
        assert!(bbb.is_razor);
        assert!(!bbb.is_unique);

        for prot in proteins.iter() {
            for key in prot.unique_ions.keys() {
                assert!(prot.urazor_ions.contains_key(key));
            }
            for key in prot.urazor_ions.keys() {
                assert!(prot.total_ions.contains_key(key));
            }
        }
    }
}
