pub mod kron;
pub mod m_reduce;
pub mod m_transpose;
pub mod mxm;
pub mod mxm_t_masked;
pub mod mxv_masked;
pub mod reduce_by_key;
pub mod v_assign_masked;
pub mod v_count_mf;
pub mod v_eadd;
pub mod v_eadd_fdb;
pub mod v_map;
pub mod v_reduce;
pub mod vxm_masked;

pub use kron::kron;
pub use m_reduce::{m_reduce, m_reduce_by_column, m_reduce_by_row};
pub use m_transpose::m_transpose;
pub use mxm::mxm;
pub use mxm_t_masked::mxm_t_masked;
pub use mxv_masked::mxv_masked;
pub use reduce_by_key::reduce_by_key;
pub use v_assign_masked::v_assign_masked;
pub use v_count_mf::v_count_mf;
pub use v_eadd::v_eadd;
pub use v_eadd_fdb::v_eadd_fdb;
pub use v_map::v_map;
pub use v_reduce::v_reduce;
pub use vxm_masked::vxm_masked;
