pub mod record_list;
