use num::Num;
use serde::de::Error as DeError;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ZeroSpVec;

impl<N> Serialize for ZeroSpVec<N>
where
    N: Num + Serialize + Copy,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // fields: len, nnz, entries
        let mut state = serializer.serialize_struct("ZeroSpVec", 3)?;
        state.serialize_field("len", &(self.len as u64))?;
        state.serialize_field("nnz", &(self.nnz() as u64))?;

        // entries are written as an ordered Vec of (index, value)
        let entries: Vec<(u64, N)> = self
            .raw_iter()
            .map(|(idx, val)| (idx as u64, *val))
            .collect();
        state.serialize_field("entries", &entries)?;
        state.end()
    }
}

impl<'de, N> Deserialize<'de> for ZeroSpVec<N>
where
    N: Num + Deserialize<'de> + Copy,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ZeroSpVecData<N> {
            len: u64,
            nnz: u64,
            entries: Vec<(u64, N)>,
        }

        let data = ZeroSpVecData::deserialize(deserializer)?;
        if data.nnz as usize != data.entries.len() {
            return Err(D::Error::custom(format!(
                "ZeroSpVec nnz mismatch: header says {}, found {} entries",
                data.nnz,
                data.entries.len()
            )));
        }

        let len = data.len as usize;
        let mut vec = ZeroSpVec::with_capacity(data.entries.len());
        vec.len = len;
        let mut prev: Option<usize> = None;
        for (index, value) in data.entries {
            let index = index as usize;
            if index >= len || prev.map_or(false, |p| p >= index) {
                return Err(D::Error::custom(format!(
                    "ZeroSpVec entry index {} is out of order or out of range (len {})",
                    index, len
                )));
            }
            prev = Some(index);
            vec.ind.push(index);
            vec.val.push(value);
        }
        Ok(vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_json_keeps_len_and_entries() {
        let vec = ZeroSpVec::from(vec![0.0, 0.25, 0.0, 0.5]);
        let s = serde_json::to_string(&vec).unwrap();
        let de: ZeroSpVec<f64> = serde_json::from_str(&s).unwrap();
        assert_eq!(de, vec);
        assert_eq!(de.len(), 4);
    }

    #[test]
    fn serde_rejects_unsorted_entries() {
        let bad = r#"{"len":4,"nnz":2,"entries":[[3,1.0],[1,2.0]]}"#;
        assert!(serde_json::from_str::<ZeroSpVec<f64>>(bad).is_err());
    }

    #[test]
    fn serde_rejects_nnz_mismatch() {
        let bad = r#"{"len":4,"nnz":3,"entries":[[1,1.0]]}"#;
        assert!(serde_json::from_str::<ZeroSpVec<f64>>(bad).is_err());
    }
}
